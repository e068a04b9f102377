//! awtrix-weather CLI
//!
//! Usage:
//!   awtrix-weather run                  # Publish with default settings
//!   awtrix-weather run -c config.yaml   # Publish with a config file
//!   awtrix-weather generate             # Build awtrix-weather.yaml interactively
//!   awtrix-weather generate -o my.yaml  # Build a config at a custom path

use argh::FromArgs;
use awtrix_weather::cli::{GenerateCommand, RunCommand};

/// Weather and custom messages for an AWTRIX display, over MQTT
#[derive(FromArgs)]
struct Args {
    /// show version information
    #[argh(switch, short = 'V')]
    version: bool,

    #[argh(subcommand)]
    command: Option<Command>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Run(RunCommand),
    Generate(GenerateCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    awtrix_weather::setup_logging();

    let args: Args = argh::from_env();

    if args.version {
        println!("awtrix-weather {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match args.command {
        Some(Command::Run(cmd)) => {
            if let Err(e) = cmd.run().await {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
        Some(Command::Generate(cmd)) => {
            if let Err(e) = cmd.run() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            eprintln!("No command given. Run 'awtrix-weather --help' for usage.");
            std::process::exit(2);
        }
    }

    Ok(())
}
