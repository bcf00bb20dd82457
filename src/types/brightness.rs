//! Brightness control for Yeelight bulbs.

use serde::{Deserialize, Serialize};

/// Brightness level from 0 to 100 percent.
///
/// Bulbs never report or accept a true 0: their floor is 1. A raw value of 1
/// is shown as 0, and 0 is sent to the bulb as 1.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    const MAX: u8 = 100;
    const DEVICE_FLOOR: u8 = 1;

    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is above 100.
    ///
    /// ```
    /// use yeelight_rs::Brightness;
    ///
    /// assert!(Brightness::create(0).is_some());
    /// assert!(Brightness::create(100).is_some());
    /// assert!(Brightness::create(101).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Brightness { value })
        } else {
            None
        }
    }

    /// Clamps the value into 0-100.
    pub fn clamped(value: i64) -> Self {
        Brightness {
            value: value.clamp(0, Self::MAX as i64) as u8,
        }
    }

    /// Decode a raw brightness reported by a bulb.
    ///
    /// ```
    /// use yeelight_rs::Brightness;
    ///
    /// assert_eq!(Brightness::from_device(1).value(), 0);
    /// assert_eq!(Brightness::from_device(0).value(), 0);
    /// assert_eq!(Brightness::from_device(42).value(), 42);
    /// ```
    pub fn from_device(raw: i64) -> Self {
        if raw == Self::DEVICE_FLOOR as i64 {
            Brightness { value: 0 }
        } else {
            Self::clamped(raw)
        }
    }

    /// The raw value to send to a bulb.
    pub fn to_device(&self) -> u8 {
        self.value.max(Self::DEVICE_FLOOR)
    }
}
