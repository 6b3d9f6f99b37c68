use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use edgewarden::app::App;
use edgewarden::config::Config;

#[derive(Parser)]
#[command(name = "edgewarden", version, about = "Risk-managed arbitrage decision and execution orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the orchestration loop against the paper backend.
    Run {
        /// Path to the TOML configuration file.
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
        /// Score and admit but never dispatch.
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate the configuration file and exit.
    Check {
        /// Path to the TOML configuration file.
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, dry_run } => {
            let mut config = match Config::load(&config) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to load config: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if dry_run {
                config.dry_run = true;
            }

            config.init_logging();
            info!("edgewarden starting");

            tokio::select! {
                result = App::run(config) => {
                    if let Err(e) = result {
                        error!(error = %e, "Fatal error");
                        return ExitCode::FAILURE;
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
            }

            info!("edgewarden stopped");
            ExitCode::SUCCESS
        }
        Command::Check { config } => match Config::load(&config) {
            Ok(_) => {
                println!("configuration OK");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("configuration invalid: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
