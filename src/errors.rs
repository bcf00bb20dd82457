/// All error types that can occur when talking to Yeelight bulbs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize a request to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize a response line.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// The location is not a `host:port` endpoint.
    #[error("invalid location {0:?}; expected host:port")]
    InvalidLocation(String),

    /// The bulb answered with an error object.
    #[error("device error {code}: {message}")]
    Device { code: i64, message: String },

    /// The response carried neither a `result` nor an `error`.
    #[error("response has no result")]
    MissingResult,

    /// The property result array is shorter than expected.
    #[error("property at index {0} missing from result")]
    MissingProperty(usize),

    /// The property at `index` could not be decoded.
    #[error("property at index {index} has unexpected value {value}")]
    InvalidProperty {
        index: usize,
        value: serde_json::Value,
    },

    /// The action name is not one the binding understands.
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    /// The command cannot be expressed for the configured action.
    #[error("command {command} is not supported by action {action}")]
    UnsupportedCommand { action: String, command: String },

    /// The host item registry does not know the item.
    #[error("item not found {0}")]
    ItemNotFound(String),

    /// A configuration value failed to parse.
    #[error("invalid value {value:?} for configuration key {key}")]
    InvalidConfig { key: String, value: String },
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new unsupported command error
    pub fn unsupported(action: impl ToString, command: impl ToString) -> Self {
        Error::UnsupportedCommand {
            action: action.to_string(),
            command: command.to_string(),
        }
    }

    /// Create a new invalid config error
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Error::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Returns `true` if this error was caused by a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Socket { err, .. } if err.kind() == std::io::ErrorKind::TimedOut)
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
