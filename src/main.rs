mod cli;
mod config;
mod http_server;
mod lastfm;
mod logging;
mod ports;
mod services;
mod spotify;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::WrapErr};

use crate::{
    config::Config,
    lastfm::LastfmClient,
    logging::setup_logging,
    services::recommend::RecommendService,
    spotify::SpotifyCatalog,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "CRATEDIGGER_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: off)
    #[arg(long, default_value = "off", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "CRATEDIGGER_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find recommendations interactively
    Recommend,
    /// Build and edit your artist's recommendation set
    Manage,
    /// Serve the HTTP recommendation endpoint
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "3000", env = "CRATEDIGGER_HTTP_PORT")]
        port: u16,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn build_service(config: &Config) -> RecommendService<SpotifyCatalog, LastfmClient> {
    let spotify = config.spotify_config();
    if spotify.client_id.is_empty() || spotify.client_secret.is_empty() {
        log::warn!("Spotify credentials are not configured; catalog lookups will come up empty");
    }
    let lastfm = config.lastfm_config();
    if lastfm.api_key.is_empty() {
        log::warn!("Last.fm credentials are not configured; similarity lookups will come up empty");
    }

    RecommendService::new(
        Arc::new(SpotifyCatalog::new(spotify.client_id, spotify.client_secret)),
        Arc::new(LastfmClient::new(lastfm.api_key, lastfm.shared_secret)),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("cratedigger starting");

    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load cratedigger config")?;

    match args.command {
        Commands::Recommend => {
            let service = build_service(&config);
            cli::run(&service).await?;
        }
        Commands::Manage => {
            let service = build_service(&config);
            cli::run_manage(&service).await?;
        }
        Commands::Serve { port } => {
            let service = build_service(&config);
            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(port, service).await?;
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                log::info!("Default config created successfully");
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
