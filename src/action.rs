//! Binding actions.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// What a bound item does with its bulb.
///
/// The action picks both the command sent when the item receives an intent
/// and how a property query is decoded into the item's state. Its string form
/// is the name used in binding configurations.
///
/// ```
/// use std::str::FromStr;
/// use yeelight_rs::Action;
///
/// assert_eq!(Action::from_str("set_bright").unwrap(), Action::SetBright);
/// assert_eq!(Action::SetHsb.to_string(), "set_hsb");
/// assert!(Action::from_str("set_scene").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Toggle,
    GetProp,
    SetBright,
    #[default]
    SetPower,
    SetCt,
    SetHsb,
    SetRgb,
}

impl Action {
    /// Whether a polling tick has anything to refresh for this action.
    ///
    /// `toggle` is stateless.
    pub fn is_polled(&self) -> bool {
        !matches!(self, Action::Toggle)
    }
}
