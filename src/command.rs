//! External intents and the bulb requests that carry them out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::codec::{CommandRequest, Param};
use crate::errors::Error;
use crate::state::property_query;
use crate::types::{Brightness, Color, ColorTemperature, Hsb, PowerMode};

type Result<T> = std::result::Result<T, Error>;

const SMOOTH: &str = "smooth";
const TRANSITION_MS: u16 = 500;

/// An intent sent to a bound item by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Command {
    OnOff(PowerMode),
    /// A 0-100 percent value (brightness or color temperature).
    Percent(u8),
    Hsb(Hsb),
    Rgb(Color),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::OnOff(p) => write!(f, "{}", p.as_ref().to_uppercase()),
            Command::Percent(p) => write!(f, "{p}"),
            Command::Hsb(hsb) => write!(f, "{},{},{}", hsb.hue(), hsb.saturation(), hsb.brightness()),
            Command::Rgb(c) => write!(f, "rgb({},{},{})", c.red(), c.green(), c.blue()),
        }
    }
}

/// `set_power` with the fixed-arity placeholder transition.
pub fn power(mode: PowerMode) -> CommandRequest {
    CommandRequest::new(
        "set_power",
        vec![Param::from(mode.as_ref()), Param::from(""), Param::from(0)],
    )
}

pub fn toggle() -> CommandRequest {
    CommandRequest::new("toggle", vec![])
}

/// `set_bright` with a smooth transition. Brightness 0 is sent as the bulb floor.
pub fn bright(brightness: Brightness) -> CommandRequest {
    CommandRequest::new(
        "set_bright",
        vec![
            Param::from(brightness.to_device()),
            Param::from(SMOOTH),
            Param::from(TRANSITION_MS),
        ],
    )
}

pub fn color_temperature(ct: ColorTemperature) -> CommandRequest {
    CommandRequest::new(
        "set_ct_abx",
        vec![
            Param::from(ct.kelvin()),
            Param::from(SMOOTH),
            Param::from(TRANSITION_MS),
        ],
    )
}

/// `set_hsv` with the hue and saturation of `hsb`; brightness is not included.
pub fn hsv(hsb: Hsb) -> CommandRequest {
    CommandRequest::new(
        "set_hsv",
        vec![
            Param::from(hsb.hue()),
            Param::from(hsb.saturation()),
            Param::from(SMOOTH),
            Param::from(TRANSITION_MS),
        ],
    )
}

pub fn rgb(color: Color) -> CommandRequest {
    CommandRequest::new(
        "set_rgb",
        vec![
            Param::from(color.packed()),
            Param::from(SMOOTH),
            Param::from(TRANSITION_MS),
        ],
    )
}

/// `get_prop` for the properties every poll reads.
pub fn properties() -> CommandRequest {
    CommandRequest::new(Action::GetProp.as_ref(), property_query())
}

/// The requests that carry out `command` for an item bound with `action`.
///
/// Requests are returned in the order they must be sent.
///
/// ```
/// use yeelight_rs::{Action, Color, Command, requests_for};
///
/// let reqs = requests_for(Action::SetRgb, &Command::Rgb(Color::rgb(255, 0, 0))).unwrap();
/// assert_eq!(reqs[0].method(), "set_rgb");
/// assert_eq!(reqs[0].params()[0].to_string(), "16711680");
/// ```
pub fn requests_for(action: Action, command: &Command) -> Result<Vec<CommandRequest>> {
    let unsupported = || Error::unsupported(action, command);

    match (action, command) {
        (Action::SetPower, Command::OnOff(mode)) => Ok(vec![power(*mode)]),
        (Action::Toggle, Command::OnOff(PowerMode::On)) => Ok(vec![toggle()]),
        (Action::Toggle, Command::OnOff(PowerMode::Off)) => Ok(vec![]),
        (Action::SetBright, Command::Percent(p)) => {
            Ok(vec![bright(Brightness::clamped(*p as i64))])
        }
        (Action::SetCt, Command::Percent(p)) => {
            Ok(vec![color_temperature(ColorTemperature::clamped(*p as i64))])
        }
        (Action::SetHsb, Command::Hsb(hsb)) => Ok(vec![hsv(*hsb), bright(hsb.brightness_level())]),
        (Action::SetRgb, Command::Hsb(hsb)) => {
            Ok(vec![rgb(hsb.hue_color()), bright(hsb.brightness_level())])
        }
        (Action::SetRgb, Command::Rgb(color)) => Ok(vec![rgb(*color)]),
        (Action::SetBright | Action::SetHsb | Action::SetRgb, Command::OnOff(mode)) => {
            Ok(vec![power(*mode)])
        }
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(reqs: &[CommandRequest]) -> Vec<(String, String)> {
        reqs.iter()
            .map(|r| {
                let params: Vec<String> = r.params().iter().map(|p| p.to_string()).collect();
                (r.method().to_string(), params.join(","))
            })
            .collect()
    }

    fn pair(method: &str, params: &str) -> (String, String) {
        (method.to_string(), params.to_string())
    }

    #[test]
    fn test_power_placeholders() {
        let reqs = requests_for(Action::SetPower, &Command::OnOff(PowerMode::Off)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_power", "\"off\",\"\",0")]);
    }

    #[test]
    fn test_toggle_only_on() {
        let on = requests_for(Action::Toggle, &Command::OnOff(PowerMode::On)).unwrap();
        assert_eq!(encoded(&on), vec![pair("toggle", "")]);
        let off = requests_for(Action::Toggle, &Command::OnOff(PowerMode::Off)).unwrap();
        assert!(off.is_empty());
    }

    #[test]
    fn test_brightness_zero_sent_as_floor() {
        let reqs = requests_for(Action::SetBright, &Command::Percent(0)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_bright", "1,\"smooth\",500")]);
        let reqs = requests_for(Action::SetBright, &Command::Percent(75)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_bright", "75,\"smooth\",500")]);
    }

    #[test]
    fn test_color_temperature() {
        let reqs = requests_for(Action::SetCt, &Command::Percent(0)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_ct_abx", "1700,\"smooth\",500")]);
        let reqs = requests_for(Action::SetCt, &Command::Percent(100)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_ct_abx", "6500,\"smooth\",500")]);
    }

    #[test]
    fn test_percent_above_range_is_clamped() {
        let reqs = requests_for(Action::SetBright, &Command::Percent(150)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_bright", "100,\"smooth\",500")]);
        let reqs = requests_for(Action::SetCt, &Command::Percent(101)).unwrap();
        assert_eq!(encoded(&reqs), vec![pair("set_ct_abx", "6500,\"smooth\",500")]);
    }

    #[test]
    fn test_hsb_uses_set_hsv_then_brightness() {
        let hsb = Hsb::create(200, 80, 40).unwrap();
        let reqs = requests_for(Action::SetHsb, &Command::Hsb(hsb)).unwrap();
        assert_eq!(
            encoded(&reqs),
            vec![
                pair("set_hsv", "200,80,\"smooth\",500"),
                pair("set_bright", "40,\"smooth\",500"),
            ]
        );
    }

    #[test]
    fn test_rgb_from_hsb() {
        let hsb = Hsb::create(0, 100, 0).unwrap();
        let reqs = requests_for(Action::SetRgb, &Command::Hsb(hsb)).unwrap();
        assert_eq!(
            encoded(&reqs),
            vec![
                pair("set_rgb", "16711680,\"smooth\",500"),
                pair("set_bright", "1,\"smooth\",500"),
            ]
        );
    }

    #[test]
    fn test_onoff_on_dimmer_and_color_items() {
        for action in [Action::SetBright, Action::SetHsb, Action::SetRgb] {
            let reqs = requests_for(action, &Command::OnOff(PowerMode::On)).unwrap();
            assert_eq!(encoded(&reqs), vec![pair("set_power", "\"on\",\"\",0")]);
        }
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(
            requests_for(Action::GetProp, &Command::Percent(5)).unwrap_err(),
            Error::unsupported("get_prop", "5")
        );
        assert!(requests_for(Action::SetPower, &Command::Percent(5)).is_err());
        assert!(requests_for(Action::SetHsb, &Command::Rgb(Color::new())).is_err());
    }

    #[test]
    fn test_properties_request() {
        let req = properties();
        assert_eq!(req.method(), "get_prop");
        assert_eq!(req.params().len(), 6);
    }
}
