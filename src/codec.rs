//! JSON line encoding of requests and decoding of responses.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Shared by every device; ids are never reused within the process.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Draw the next request id.
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

/// A single request parameter.
///
/// Strings are rendered as quoted JSON strings, everything else as a bare
/// JSON literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Str(String),
    Int(i64),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Str(s) => write!(f, "{s:?}"),
            Param::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

macro_rules! param_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Param {
            fn from(value: $t) -> Self {
                Param::Int(value as i64)
            }
        })*
    };
}

param_from_int!(u8, u16, u32, i32, i64);

/// A request to a bulb. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRequest {
    id: u64,
    method: String,
    params: Vec<Param>,
}

impl CommandRequest {
    /// Build a request with a freshly drawn id.
    pub fn new(method: &str, params: Vec<Param>) -> Self {
        CommandRequest {
            id: next_id(),
            method: method.to_string(),
            params,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Encode as a single `\r\n`-terminated JSON line.
    ///
    /// ```
    /// use yeelight_rs::{CommandRequest, Param};
    ///
    /// let req = CommandRequest::new("set_bright", vec![Param::from(50), Param::from("smooth")]);
    /// let line = req.encode().unwrap();
    /// assert!(line.ends_with(",\"method\":\"set_bright\",\"params\":[50,\"smooth\"]}\r\n"));
    /// ```
    pub fn encode(&self) -> Result<String> {
        let mut line = serde_json::to_string(self).map_err(Error::JsonDump)?;
        line.push_str("\r\n");
        Ok(line)
    }
}

/// The `error` object of a failed request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceError {
    pub code: i64,
    pub message: String,
}

/// A decoded response line.
///
/// Property queries carry a positional `result` array whose meaning is fixed
/// by the order of the query's parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<DeviceError>,
}

impl CommandResponse {
    /// Decode one response line.
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim_end()).map_err(Error::JsonLoad)
    }

    /// The result array, or the device error the bulb reported.
    pub fn result(&self) -> Result<&[Value]> {
        if let Some(err) = &self.error {
            return Err(Error::Device {
                code: err.code,
                message: err.message.clone(),
            });
        }
        self.result.as_deref().ok_or(Error::MissingResult)
    }

    /// Returns `true` if the bulb acknowledged the request with `["ok"]`.
    pub fn is_ok(&self) -> bool {
        matches!(self.result.as_deref(), Some([Value::String(s)]) if s == "ok")
    }

    /// The raw property at `index`.
    pub fn property(&self, index: usize) -> Result<&Value> {
        self.result()?
            .get(index)
            .ok_or(Error::MissingProperty(index))
    }

    /// The property at `index` as an integer.
    ///
    /// Bulbs report numbers as JSON strings; plain JSON numbers are accepted too.
    pub fn int_property(&self, index: usize) -> Result<i64> {
        let value = self.property(index)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| Error::InvalidProperty {
            index,
            value: value.clone(),
        })
    }

    /// The property at `index` as a string.
    pub fn str_property(&self, index: usize) -> Result<&str> {
        let value = self.property(index)?;
        value.as_str().ok_or_else(|| Error::InvalidProperty {
            index,
            value: value.clone(),
        })
    }
}
