//! Hue, saturation and brightness color representation.

use serde::{Deserialize, Serialize};

use super::{Brightness, Color};

/// Hue, saturation and brightness triple.
///
/// - Hue: the color angle on the color wheel (0-359 degrees)
/// - Saturation: the intensity of the color (0-100 percent)
/// - Brightness: 0-100 percent
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hsb {
    pub(crate) hue: u16,
    pub(crate) saturation: u8,
    pub(crate) brightness: u8,
}

impl Hsb {
    /// Create a new Hsb with the given values.
    ///
    /// Returns `None` if values are outside valid ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_rs::Hsb;
    ///
    /// assert!(Hsb::create(0, 100, 100).is_some());
    /// assert!(Hsb::create(359, 50, 0).is_some());
    /// assert!(Hsb::create(360, 50, 50).is_none());
    /// assert!(Hsb::create(180, 101, 50).is_none());
    /// ```
    pub fn create(hue: u16, saturation: u8, brightness: u8) -> Option<Self> {
        if hue < 360 && saturation <= 100 && brightness <= 100 {
            Some(Hsb {
                hue,
                saturation,
                brightness,
            })
        } else {
            None
        }
    }

    /// Build from raw bulb properties, clamping out-of-range values.
    ///
    /// The brightness follows the same floor rule as [`Brightness::from_device`].
    pub fn from_device(hue: i64, saturation: i64, brightness: i64) -> Self {
        Hsb {
            hue: hue.rem_euclid(360) as u16,
            saturation: saturation.clamp(0, 100) as u8,
            brightness: Brightness::from_device(brightness).value(),
        }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// The brightness component as a [`Brightness`].
    pub fn brightness_level(&self) -> Brightness {
        Brightness::clamped(self.brightness as i64)
    }

    /// Convert to RGB using all three components.
    ///
    /// # Examples
    ///
    /// ```
    /// use yeelight_rs::Hsb;
    ///
    /// let color = Hsb::create(0, 100, 100).unwrap().to_color();
    /// assert_eq!((color.red(), color.green(), color.blue()), (255, 0, 0));
    /// ```
    pub fn to_color(&self) -> Color {
        hsv_to_color(self.hue, self.saturation, self.brightness as f32 / 100.0)
    }

    /// Convert hue and saturation to RGB at full brightness.
    ///
    /// Bulbs take color and brightness as separate commands.
    pub fn hue_color(&self) -> Color {
        hsv_to_color(self.hue, self.saturation, 1.0)
    }
}

fn hsv_to_color(hue: u16, saturation: u8, v: f32) -> Color {
    let s = saturation as f32 / 100.0;

    if s == 0.0 {
        let gray = (v * 255.0).round() as u8;
        return Color::rgb(gray, gray, gray);
    }

    let h = (hue % 360) as f32 / 60.0;
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Color::rgb(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

impl From<&Hsb> for Color {
    fn from(hsb: &Hsb) -> Self {
        hsb.to_color()
    }
}

impl From<&Color> for Hsb {
    fn from(color: &Color) -> Self {
        color.to_hsb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_device_brightness_floor() {
        let hsb = Hsb::from_device(120, 50, 1);
        assert_eq!((hsb.hue(), hsb.saturation(), hsb.brightness()), (120, 50, 0));
    }

    #[test]
    fn test_from_device_clamps() {
        let hsb = Hsb::from_device(360, 150, 200);
        assert_eq!((hsb.hue(), hsb.saturation(), hsb.brightness()), (0, 100, 100));
    }

    #[test]
    fn test_hue_color_ignores_brightness() {
        let hsb = Hsb::create(120, 100, 20).unwrap();
        assert_eq!(hsb.hue_color(), Color::rgb(0, 255, 0));
        assert_eq!(hsb.to_color(), Color::rgb(0, 51, 0));
    }

    #[test]
    fn test_primary_colors_round_trip() {
        for color in [
            Color::rgb(255, 0, 0),
            Color::rgb(0, 255, 0),
            Color::rgb(0, 0, 255),
            Color::rgb(255, 255, 0),
            Color::rgb(255, 255, 255),
        ] {
            assert_eq!(color.to_hsb().to_color(), color);
        }
    }
}
