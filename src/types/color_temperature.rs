//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature as a 0-100 percent of the bulb's white range.
///
/// Bulbs work in Kelvin from 1700K to 6500K; each percent step is 48K.
/// Lower values produce warmer light.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ColorTemperature {
    pub(crate) percent: u8,
}

impl ColorTemperature {
    pub const MIN_KELVIN: u16 = 1700;
    pub const MAX_KELVIN: u16 = 6500;
    const STEP: i64 = 48;
    const MAX: u8 = 100;

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Returns `None` if percent is above 100.
    pub fn create(percent: u8) -> Option<Self> {
        if percent <= Self::MAX {
            Some(ColorTemperature { percent })
        } else {
            None
        }
    }

    /// Clamps the percent into 0-100.
    pub fn clamped(percent: i64) -> Self {
        ColorTemperature {
            percent: percent.clamp(0, Self::MAX as i64) as u8,
        }
    }

    /// Map a Kelvin value reported by a bulb onto the percent scale.
    ///
    /// Values outside the bulb range are clamped.
    ///
    /// ```
    /// use yeelight_rs::ColorTemperature;
    ///
    /// assert_eq!(ColorTemperature::from_kelvin(1700).percent(), 0);
    /// assert_eq!(ColorTemperature::from_kelvin(4000).percent(), 47);
    /// assert_eq!(ColorTemperature::from_kelvin(6500).percent(), 100);
    /// assert_eq!(ColorTemperature::from_kelvin(1000).percent(), 0);
    /// ```
    pub fn from_kelvin(kelvin: i64) -> Self {
        Self::clamped((kelvin - Self::MIN_KELVIN as i64) / Self::STEP)
    }

    /// The Kelvin value to send to a bulb.
    ///
    /// ```
    /// use yeelight_rs::ColorTemperature;
    ///
    /// let ct = ColorTemperature::create(50).unwrap();
    /// assert_eq!(ct.kelvin(), 4100);
    /// ```
    pub fn kelvin(&self) -> u16 {
        Self::MIN_KELVIN + Self::STEP as u16 * self.percent as u16
    }
}
