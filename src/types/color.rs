//! RGB color representation and the packed integer form used on the wire.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Hsb;

/// An RGB color with red, green, and blue components (0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
}

impl Color {
    /// Create a color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a default color (black: 0,0,0).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// Pack into `red * 65536 + green * 256 + blue`.
    ///
    /// ```
    /// use yeelight_rs::Color;
    ///
    /// assert_eq!(Color::rgb(255, 0, 0).packed(), 16711680);
    /// assert_eq!(Color::rgb(0, 0, 255).packed(), 255);
    /// ```
    pub fn packed(&self) -> u32 {
        self.red as u32 * 65536 + self.green as u32 * 256 + self.blue as u32
    }

    /// Unpack a value produced by [`Color::packed`].
    ///
    /// Returns `None` for negative values or values above `0xFFFFFF`.
    pub fn from_packed(value: i64) -> Option<Self> {
        if !(0..=0xFF_FFFF).contains(&value) {
            return None;
        }
        let red = value / 65536;
        let green = (value - red * 65536) / 256;
        let blue = value - red * 65536 - green * 256;
        Some(Self::rgb(red as u8, green as u8, blue as u8))
    }

    /// Convert to hue/saturation/brightness.
    ///
    /// ```
    /// use yeelight_rs::Color;
    ///
    /// let hsb = Color::rgb(255, 0, 0).to_hsb();
    /// assert_eq!((hsb.hue(), hsb.saturation(), hsb.brightness()), (0, 100, 100));
    /// ```
    pub fn to_hsb(&self) -> Hsb {
        let (r, g, b) = (self.red as f32, self.green as f32, self.blue as f32);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let brightness = max / 255.0;
        let saturation = if max > 0.0 { delta / max } else { 0.0 };

        let hue = if delta == 0.0 {
            0.0
        } else {
            let rc = (max - r) / delta;
            let gc = (max - g) / delta;
            let bc = (max - b) / delta;
            let sector = if r == max {
                bc - gc
            } else if g == max {
                2.0 + rc - bc
            } else {
                4.0 + gc - rc
            };
            let h = sector / 6.0;
            if h < 0.0 { h + 1.0 } else { h }
        };

        Hsb {
            hue: (hue * 360.0).round() as u16 % 360,
            saturation: (saturation * 100.0).round() as u8,
            brightness: (brightness * 100.0).round() as u8,
        }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse from comma-separated string (e.g., "255,128,0").
    fn from_str(s: &str) -> Result<Self, String> {
        let parts: Vec<u8> = s
            .split(',')
            .map(|c| c.trim().parse().map_err(|_| format!("invalid component {c:?}")))
            .collect::<Result<_, _>>()?;
        match parts[..] {
            [r, g, b] => Ok(Self::rgb(r, g, b)),
            _ => Err("Expected format: r,g,b".into()),
        }
    }
}
