//! Power mode for light control.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Power state for a light.
///
/// The wire form is the lowercase name used by `set_power` and reported at
/// index 0 of a property query.
///
/// ```
/// use std::str::FromStr;
/// use yeelight_rs::PowerMode;
///
/// assert_eq!(PowerMode::On.as_ref(), "on");
/// assert_eq!(PowerMode::from_str("off").unwrap(), PowerMode::Off);
/// ```
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

impl PowerMode {
    /// Decode the power property reported by a bulb.
    ///
    /// Only `"on"` means on; anything else is treated as off.
    pub fn from_device(value: &str) -> Self {
        if value == "on" {
            PowerMode::On
        } else {
            PowerMode::Off
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PowerMode::On)
    }
}

impl From<bool> for PowerMode {
    fn from(on: bool) -> Self {
        if on { PowerMode::On } else { PowerMode::Off }
    }
}
