//! Semantic item state and decoding of property queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::codec::{CommandResponse, Param};
use crate::errors::Error;
use crate::types::{Brightness, Color, ColorTemperature, Hsb, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// The properties requested by every poll, in positional order.
pub const PROPERTIES: [&str; 6] = ["power", "bright", "ct", "hue", "sat", "rgb"];

const POWER: usize = 0;
const BRIGHT: usize = 1;
const CT: usize = 2;
const HUE: usize = 3;
const SAT: usize = 4;
const RGB: usize = 5;

/// Parameters of a `get_prop` query for [`PROPERTIES`].
pub fn property_query() -> Vec<Param> {
    PROPERTIES.iter().map(|p| Param::from(*p)).collect()
}

/// The state of an item as seen by the host, derived from raw bulb values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum State {
    Power(PowerMode),
    Brightness(Brightness),
    ColorTemperature(ColorTemperature),
    /// Hue/saturation/brightness, either reported directly or derived from RGB.
    Hsb(Hsb),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Power(p) => write!(f, "{}", p.as_ref().to_uppercase()),
            State::Brightness(b) => write!(f, "{}", b.value()),
            State::ColorTemperature(ct) => write!(f, "{}", ct.percent()),
            State::Hsb(hsb) => write!(f, "{},{},{}", hsb.hue(), hsb.saturation(), hsb.brightness()),
        }
    }
}

/// Decode the state `action` exposes from a property query response.
///
/// ```
/// use yeelight_rs::{Action, CommandResponse, translate};
///
/// let resp = CommandResponse::parse(r#"{"id":1,"result":["on","1","4100","0","0","0"]}"#).unwrap();
/// assert_eq!(translate(&resp, Action::SetBright).unwrap().to_string(), "0");
/// assert_eq!(translate(&resp, Action::SetCt).unwrap().to_string(), "50");
/// ```
pub fn translate(response: &CommandResponse, action: Action) -> Result<State> {
    match action {
        Action::SetPower => {
            let power = response.str_property(POWER)?;
            Ok(State::Power(PowerMode::from_device(power)))
        }
        Action::SetBright => {
            let bright = response.int_property(BRIGHT)?;
            Ok(State::Brightness(Brightness::from_device(bright)))
        }
        Action::SetCt => {
            let ct = response.int_property(CT)?;
            Ok(State::ColorTemperature(ColorTemperature::from_kelvin(ct)))
        }
        Action::SetHsb => {
            let hue = response.int_property(HUE)?;
            let sat = response.int_property(SAT)?;
            let bright = response.int_property(BRIGHT)?;
            Ok(State::Hsb(Hsb::from_device(hue, sat, bright)))
        }
        Action::SetRgb => {
            let rgb = response.int_property(RGB)?;
            let color = Color::from_packed(rgb).ok_or_else(|| Error::InvalidProperty {
                index: RGB,
                value: rgb.into(),
            })?;
            Ok(State::Hsb(color.to_hsb()))
        }
        Action::Toggle | Action::GetProp => Err(Error::unsupported(action, "state")),
    }
}

/// The new state if it differs from the last known one.
pub fn changed(previous: Option<&State>, current: State) -> Option<State> {
    (previous != Some(&current)).then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(result: &str) -> CommandResponse {
        CommandResponse::parse(&format!("{{\"id\":1,\"result\":{result}}}")).unwrap()
    }

    #[test]
    fn test_property_query_order() {
        let params: Vec<String> = property_query().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            params,
            ["\"power\"", "\"bright\"", "\"ct\"", "\"hue\"", "\"sat\"", "\"rgb\""]
        );
    }

    #[test]
    fn test_power() {
        let on = response(r#"["on","100","4000","0","0","0"]"#);
        let off = response(r#"["off","100","4000","0","0","0"]"#);
        assert_eq!(translate(&on, Action::SetPower).unwrap(), State::Power(PowerMode::On));
        assert_eq!(translate(&off, Action::SetPower).unwrap(), State::Power(PowerMode::Off));
    }

    #[test]
    fn test_brightness_floor() {
        let floor = response(r#"["on","1","4000","0","0","0"]"#);
        let zero = response(r#"["on","0","4000","0","0","0"]"#);
        let mid = response(r#"["on",64,"4000","0","0","0"]"#);
        assert_eq!(
            translate(&floor, Action::SetBright).unwrap(),
            State::Brightness(Brightness::create(0).unwrap())
        );
        assert_eq!(
            translate(&zero, Action::SetBright).unwrap(),
            State::Brightness(Brightness::create(0).unwrap())
        );
        assert_eq!(
            translate(&mid, Action::SetBright).unwrap(),
            State::Brightness(Brightness::create(64).unwrap())
        );
    }

    #[test]
    fn test_color_temperature() {
        let resp = response(r#"["on","1","6500","0","0","0"]"#);
        assert_eq!(
            translate(&resp, Action::SetCt).unwrap(),
            State::ColorTemperature(ColorTemperature::create(100).unwrap())
        );
    }

    #[test]
    fn test_ct_round_trip_percent() {
        for p in 0..=100u8 {
            let kelvin = ColorTemperature::create(p).unwrap().kelvin();
            assert_eq!(ColorTemperature::from_kelvin(kelvin as i64).percent(), p);
        }
    }

    #[test]
    fn test_hsb() {
        let resp = response(r#"["on","1","4000","240","75","0"]"#);
        assert_eq!(
            translate(&resp, Action::SetHsb).unwrap(),
            State::Hsb(Hsb::create(240, 75, 0).unwrap())
        );
    }

    #[test]
    fn test_rgb_red() {
        let resp = response(r#"["on","100","4000","0","0","16711680"]"#);
        let State::Hsb(hsb) = translate(&resp, Action::SetRgb).unwrap() else {
            panic!("expected hsb state");
        };
        assert_eq!(hsb.hue(), 0);
        assert_eq!(hsb.saturation(), 100);
        assert_eq!(hsb.brightness(), 100);
    }

    #[test]
    fn test_rgb_out_of_range() {
        let resp = response(r#"["on","100","4000","0","0","-5"]"#);
        assert!(matches!(
            translate(&resp, Action::SetRgb),
            Err(Error::InvalidProperty { index: 5, .. })
        ));
    }

    #[test]
    fn test_short_result() {
        let resp = response(r#"["on"]"#);
        assert_eq!(translate(&resp, Action::SetBright), Err(Error::MissingProperty(1)));
        assert!(translate(&resp, Action::SetPower).is_ok());
    }

    #[test]
    fn test_unpolled_actions() {
        let resp = response(r#"["on","100","4000","0","0","0"]"#);
        assert!(translate(&resp, Action::Toggle).is_err());
        assert!(translate(&resp, Action::GetProp).is_err());
    }

    #[test]
    fn test_changed() {
        let on = State::Power(PowerMode::On);
        let off = State::Power(PowerMode::Off);
        assert_eq!(changed(Some(&on), on), None);
        assert_eq!(changed(Some(&off), on), Some(on));
        assert_eq!(changed(None, on), Some(on));
    }
}
