//! Value types for light control parameters.

mod brightness;
mod color;
mod color_temperature;
mod hsb;
mod power;

pub use brightness::Brightness;
pub use color::Color;
pub use color_temperature::ColorTemperature;
pub use hsb::Hsb;
pub use power::PowerMode;
