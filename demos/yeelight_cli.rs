//! CLI application for controlling Yeelight bulbs.
//!
//! Covers discovery, one-off commands and a polling session that prints
//! every state update the controller publishes.
//!
//! Run with: cargo run --example yeelight_cli -- --help

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use yeelight_rs::channel::{self, TcpTransport};
use yeelight_rs::command;
use yeelight_rs::{
    Action, Color, Command, Config, Controller, DeviceRegistry, DiscoveryListener, Hsb, PowerMode,
    StateStore, StaticBindings, requests_for, translate,
};

#[derive(Parser)]
#[command(name = "yeelight-cli")]
#[command(about = "Control Yeelight bulbs from the command line", long_about = None)]
struct Cli {
    /// Bulb endpoint as host:port (not required for discover)
    #[arg(short, long, global = true)]
    location: Option<String>,

    /// Request timeout in milliseconds
    #[arg(short, long, global = true, default_value = "5000")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the network for bulbs
    Discover {
        /// How long to wait for replies, in seconds
        #[arg(short, long, default_value = "3")]
        wait: u64,

        /// Local address of the discovery socket
        #[arg(short, long, default_value = "0.0.0.0:0")]
        bind: String,
    },

    /// Read and print the current state of the bulb
    Status,

    /// Turn the bulb on
    On,

    /// Turn the bulb off
    Off,

    /// Toggle the bulb on/off
    Toggle,

    /// Set brightness (0-100)
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },

    /// Set color temperature as a percent of 1700K-6500K (0-100)
    Temperature {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },

    /// Set RGB color (0-255 for each component)
    Color { red: u8, green: u8, blue: u8 },

    /// Set hue (0-359), saturation (0-100) and brightness (0-100)
    Hsb {
        #[arg(value_parser = clap::value_parser!(u16).range(0..360))]
        hue: u16,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        saturation: u8,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: u8,
    },

    /// Poll the bulb and print state changes until interrupted
    Poll {
        /// Polling interval in seconds
        #[arg(short, long, default_value = "10")]
        refresh: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout);

    if let Commands::Discover { wait, bind } = &cli.command {
        return discover(bind, Duration::from_secs(*wait)).await;
    }

    let location = cli
        .location
        .ok_or("Bulb location is required for this command. Use --location <HOST:PORT>")?;
    let transport = TcpTransport::new(timeout);

    let (action, cmd) = match cli.command {
        Commands::Discover { .. } => unreachable!(),
        Commands::Status => return status(&transport, &location).await,
        Commands::Poll { refresh } => {
            return poll(&location, Duration::from_secs(refresh), timeout).await;
        }
        Commands::On => (Action::SetPower, Command::OnOff(PowerMode::On)),
        Commands::Off => (Action::SetPower, Command::OnOff(PowerMode::Off)),
        Commands::Toggle => (Action::Toggle, Command::OnOff(PowerMode::On)),
        Commands::Brightness { level } => (Action::SetBright, Command::Percent(level)),
        Commands::Temperature { percent } => (Action::SetCt, Command::Percent(percent)),
        Commands::Color { red, green, blue } => {
            (Action::SetRgb, Command::Rgb(Color::rgb(red, green, blue)))
        }
        Commands::Hsb {
            hue,
            saturation,
            brightness,
        } => {
            let hsb = Hsb::create(hue, saturation, brightness).ok_or("Invalid HSB value")?;
            (Action::SetHsb, Command::Hsb(hsb))
        }
    };

    println!("Sending {} ({}) to {}...", cmd, action, location);
    for request in requests_for(action, &cmd)? {
        match channel::request(&transport, &location, &request).await {
            Ok(response) => match response.error {
                None => println!("  {} ok", request.method()),
                Some(e) => eprintln!("  {} failed: {} ({})", request.method(), e.message, e.code),
            },
            Err(e) => eprintln!("  {} failed: {}", request.method(), e),
        }
    }
    Ok(())
}

async fn discover(bind: &str, wait: Duration) -> Result<(), Box<dyn std::error::Error>> {
    println!("Discovering Yeelight bulbs (waiting {}s)...", wait.as_secs());

    let listener = DiscoveryListener::start(bind, DeviceRegistry::new())?;
    listener.probe()?;
    tokio::time::sleep(wait).await;
    listener.stop();

    let devices = listener.registry().devices();
    if devices.is_empty() {
        println!("No bulbs found on the network.");
        return Ok(());
    }

    println!("\nFound {} bulb(s):", devices.len());
    for device in devices {
        println!(
            "  {:21} id: {}  model: {}",
            device.location(),
            device.id(),
            device.model().unwrap_or("?")
        );
    }
    Ok(())
}

async fn status(
    transport: &TcpTransport,
    location: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Getting status for bulb at {}...", location);
    let response = channel::request(transport, location, &command::properties()).await?;

    println!("\nBulb Status:");
    for action in [Action::SetPower, Action::SetBright, Action::SetCt, Action::SetHsb] {
        match translate(&response, action) {
            Ok(state) => println!("  {:10} {}", action.to_string(), state),
            Err(e) => println!("  {:10} unavailable ({})", action.to_string(), e),
        }
    }
    if let Ok(rgb) = response.int_property(5) {
        if let Some(color) = Color::from_packed(rgb) {
            println!(
                "  {:10} RGB({}, {}, {})",
                "rgb",
                color.red(),
                color.green(),
                color.blue()
            );
        }
    }
    Ok(())
}

async fn poll(
    location: &str,
    refresh: Duration,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(StateStore::new());

    let mut bindings = StaticBindings::new();
    for action in [Action::SetPower, Action::SetBright, Action::SetCt, Action::SetHsb] {
        bindings.parse(action.as_ref(), &format!("{location}#{action}"))?;
    }

    let config = Config {
        refresh,
        timeout,
        ..Config::default()
    };
    let mut controller = Controller::new(config, store.clone(), store.clone());
    controller.add_provider(Arc::new(bindings));
    let controller = Arc::new(controller);

    controller.start()?;
    println!("Polling {} every {}s... (Press Ctrl+C to stop)\n", location, refresh.as_secs());

    let mut seen = 0;
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let updates = store.updates();
        for (item, state) in &updates[seen..] {
            println!("[{}] {}", item, state);
        }
        seen = updates.len();
    }
}
