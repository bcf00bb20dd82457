//! Controller settings and per-item binding configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::action::Action;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Process-wide controller settings.
///
/// Serialized with millisecond durations, using the same keys as
/// [`Config::from_properties`]:
///
/// ```
/// use std::time::Duration;
/// use yeelight_rs::Config;
///
/// let config: Config = serde_json::from_str(r#"{"refresh": 30000}"#).unwrap();
/// assert_eq!(config.refresh, Duration::from_secs(30));
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interval between polling ticks.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub refresh: Duration,
    /// Bound on a whole command round trip (connect, write and read).
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    /// Local address of the discovery socket.
    ///
    /// The default ephemeral port only receives replies to probes; bind port
    /// 1982 to also receive unsolicited announcements.
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            refresh: Duration::from_millis(60_000),
            timeout: Duration::from_millis(5_000),
            bind: "0.0.0.0:0".to_string(),
        }
    }
}

impl Config {
    /// Read settings from a flat host property map.
    ///
    /// Missing or blank keys keep their defaults.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self> {
        let mut config = Config::default();
        let value = |key: &str| props.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(v) = value("refresh") {
            config.refresh = parse_millis("refresh", v)?;
        }
        if let Some(v) = value("timeout") {
            config.timeout = parse_millis("timeout", v)?;
        }
        if let Some(v) = value("bind") {
            config.bind = v.to_string();
        }
        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| Error::invalid_config(key, value))
}

/// Binds an item to a bulb and an action: `location#action`.
///
/// The location is either a `host:port` endpoint or a discovered device id.
///
/// ```
/// use yeelight_rs::{Action, BindingConfig};
///
/// let config: BindingConfig = "192.168.1.20:55443#set_bright".parse().unwrap();
/// assert_eq!(config.location, "192.168.1.20:55443");
/// assert_eq!(config.action, Action::SetBright);
///
/// let config: BindingConfig = "192.168.1.20:55443".parse().unwrap();
/// assert_eq!(config.action, Action::SetPower);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    pub location: String,
    pub action: Action,
}

impl BindingConfig {
    pub fn new(location: &str, action: Action) -> Self {
        BindingConfig {
            location: location.to_string(),
            action,
        }
    }
}

impl FromStr for BindingConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (location, action) = match s.split_once('#') {
            Some((location, action)) => (
                location,
                Action::from_str(action).map_err(|_| Error::UnknownAction(action.to_string()))?,
            ),
            None => (s, Action::default()),
        };
        Ok(BindingConfig::new(location.trim(), action))
    }
}

impl fmt::Display for BindingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.location, self.action)
    }
}
