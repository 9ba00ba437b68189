//! CLI module
//!
//! This module provides the command-line interface for the tinder client.
//! Sessions are not persisted, so every command authorizes first.

use std::io;
use std::num::NonZeroU32;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use serde_json::Value;

use crate::api::{ClientConfig, HttpTransport, SessionClient, TransportConfig};
use crate::models::API_HOST;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API host requests are sent to
    #[arg(long, env = "TINDER_API_HOST", default_value = API_HOST, global = true)]
    api_host: String,

    /// Facebook access token used to authorize
    #[arg(long, env = "FACEBOOK_TOKEN", hide_env_values = true, global = true)]
    facebook_token: Option<String>,

    /// Facebook user id used to authorize
    #[arg(long, env = "FACEBOOK_ID", global = true)]
    facebook_id: Option<String>,

    /// Give up on a request after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log every outbound request
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize and print the session defaults
    Auth,

    /// Fetch nearby profiles
    Recs {
        /// Maximum number of profiles to fetch
        #[arg(short, long, default_value = "10")]
        limit: NonZeroU32,
    },

    /// Update the current position
    Ping {
        /// Longitude
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
    },

    /// Send a message to a match
    Message {
        /// Id of the matched user
        user_id: String,

        /// Message text
        text: String,
    },

    /// Swipe left on a user
    Pass {
        /// Id of the user
        user_id: String,
    },

    /// Swipe right on a user
    Like {
        /// Id of the user
        user_id: String,
    },

    /// Fetch updates since the session started
    Updates,

    /// Fetch the full history (matches, messages, blocks)
    History,

    /// Fetch a user profile
    User {
        /// Id of the user
        user_id: String,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Run the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, bin_name, &mut io::stdout());
        return Ok(());
    }

    let client = create_client(&cli)?;
    let (facebook_token, facebook_id) = credentials(&cli)?;

    let defaults = client.authorize(facebook_token, facebook_id).await?;
    eprintln!(
        "{} as {}",
        "Authorized".green(),
        client.user_id().unwrap_or_default()
    );

    let response = match &cli.command {
        Commands::Auth => defaults,
        Commands::Recs { limit } => client.get_recommendations(*limit).await?,
        Commands::Ping { lon, lat } => client.update_position(*lon, *lat).await?,
        Commands::Message { user_id, text } => client.send_message(user_id, text).await?,
        Commands::Pass { user_id } => client.pass(user_id).await?,
        Commands::Like { user_id } => client.like(user_id).await?,
        Commands::Updates => client.get_updates().await?,
        Commands::History => client.get_history().await?,
        Commands::User { user_id } => client.get_user(user_id).await?,
        Commands::Completions { .. } => return Ok(()),
    };

    print_json(&response)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn create_client(cli: &Cli) -> Result<SessionClient, Box<dyn std::error::Error>> {
    let transport = HttpTransport::with_config(TransportConfig {
        timeout: cli.timeout_secs.map(Duration::from_secs),
    })?;

    let config = ClientConfig {
        base_url: cli.api_host.trim_end_matches('/').to_string(),
    };

    Ok(SessionClient::with_config(transport, config))
}

fn credentials(cli: &Cli) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    match (cli.facebook_token.as_deref(), cli.facebook_id.as_deref()) {
        (Some(token), Some(id)) => Ok((token, id)),
        _ => Err(
            "--facebook-token and --facebook-id (or FACEBOOK_TOKEN and FACEBOOK_ID) are required"
                .into(),
        ),
    }
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
