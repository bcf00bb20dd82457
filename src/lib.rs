//! # yeelight_rs
//!
//! An async Rust library for discovering, polling and controlling Yeelight smart
//! bulbs over their LAN protocol.
//!
//! This crate provides a **runtime-agnostic** async API. Bulbs are found with
//! multicast discovery, polled over a line-based TCP/JSON protocol, and their
//! raw properties are translated into on/off, brightness, color temperature and
//! hue/saturation/brightness states.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use yeelight_rs::{Command, Config, Controller, PowerMode, StateStore, StaticBindings};
//!
//! async fn control_light() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(StateStore::new());
//!
//!     // Bind items to bulbs: "host:port#action" or "device-id#action"
//!     let mut bindings = StaticBindings::new();
//!     bindings.parse("Lamp", "192.168.1.20:55443#set_power")?;
//!     bindings.parse("LampColor", "192.168.1.20:55443#set_rgb")?;
//!
//!     let mut controller = Controller::new(Config::default(), store.clone(), store.clone());
//!     controller.add_provider(Arc::new(bindings));
//!     let controller = Arc::new(controller);
//!
//!     // Start discovery and periodic polling
//!     controller.start()?;
//!
//!     // Turn the lamp on
//!     controller.receive_command("Lamp", &Command::OnOff(PowerMode::On)).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Runtime Agnostic**: Works with tokio, async-std, or smol async runtimes
//! - **Discovery**: Multicast search and announcements via [`DiscoveryListener`]
//! - **Polling**: One property query per bulb per tick with change detection, see [`Controller`]
//! - **Colors**: RGB with [`Color`], hue/saturation/brightness with [`Hsb`]
//! - **Brightness**: 0-100% using [`Brightness`]
//! - **Color Temperature**: 1700K-6500K as a percent using [`ColorTemperature`]
//! - **Power Control**: Turn lights on/off or toggle with [`PowerMode`]
//!
//! ## Communication
//!
//! Discovery uses the multicast group `239.255.255.250:1982`. Commands are
//! sent over a fresh TCP connection to the bulb's advertised `host:port`
//! (usually port 55443), one JSON line per request and per response.
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod action;
pub mod channel;
mod codec;
pub mod command;
mod config;
mod controller;
mod discovery;
mod errors;
pub mod host;
pub mod runtime;
mod state;
mod types;

// Re-export public API
pub use action::Action;
pub use channel::{TcpTransport, Transport};
pub use codec::{CommandRequest, CommandResponse, DeviceError, Param, next_id};
pub use command::{Command, requests_for};
pub use config::{BindingConfig, Config};
pub use controller::Controller;
pub use discovery::{Device, DeviceRegistry, DiscoveryListener, MULTICAST_ADDR, MULTICAST_PORT};
pub use errors::Error;
pub use host::{BindingProvider, EventPublisher, ItemRegistry, StateStore, StaticBindings};
pub use state::{PROPERTIES, State, changed, translate};
pub use types::{Brightness, Color, ColorTemperature, Hsb, PowerMode};
