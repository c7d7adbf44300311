//! FireWS CLI - Command-line interface for FireWS channel state servers
//!
//! Generate and inspect auth tokens, manage namespaces and make one-shot
//! calls against a server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use firews_client::{FireWs, FireWsBuilder};
use firews_core::{Algorithm, Response};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod tokens;

/// FireWS - channel state and pub/sub client
#[derive(Parser)]
#[command(name = "firews")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Server address (tcp://host:port or unix:///path)
    #[arg(short, long, global = true, env = "FIREWS_ADDR")]
    address: Option<String>,

    /// Namespace to authenticate against after connecting
    #[arg(short, long, global = true, env = "FIREWS_NAMESPACE")]
    namespace: Option<String>,

    /// Namespace secret key
    #[arg(short, long, global = true, env = "FIREWS_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Connect timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an auth token for a user
    Token {
        /// User id placed in the token payload
        user: String,

        /// Signing algorithm (HS256, HS384, HS512, RS256, RS384, RS512)
        #[arg(long, default_value = "HS256")]
        algo: Algorithm,

        /// PEM private key for RS* algorithms
        #[arg(short, long)]
        key_file: Option<PathBuf>,
    },

    /// Decode a token, verifying it when a secret or key file is given
    Decode {
        token: String,

        /// Expected algorithm (defaults to the header's)
        #[arg(long)]
        algo: Option<Algorithm>,

        /// PEM public key for RS* algorithms
        #[arg(short, long)]
        key_file: Option<PathBuf>,
    },

    /// Register a namespace and print its secret key
    Register {
        name: String,

        /// Server master key
        key: String,
    },

    /// Broadcast data to a channel
    Send {
        channel: String,

        /// Data (JSON, or a plain string)
        data: String,

        #[arg(short, long)]
        user: Option<String>,
    },

    /// Store base state for a channel
    Set {
        channel: String,

        /// Data (JSON, or a plain string)
        data: String,

        #[arg(short, long)]
        user: Option<String>,

        /// Expiry hint in seconds
        #[arg(short, long)]
        ttl: Option<u64>,

        /// Also broadcast to listeners
        #[arg(short, long)]
        emit: bool,
    },

    /// Append to base state for a channel
    Push {
        channel: String,

        /// Data (JSON, or a plain string)
        data: String,

        #[arg(short, long)]
        user: Option<String>,

        /// Expiry hint in seconds
        #[arg(short, long)]
        ttl: Option<u64>,

        /// Also broadcast to listeners
        #[arg(short, long)]
        emit: bool,
    },

    /// Fetch base state for a channel
    Get {
        channel: String,

        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show channel info
    Info { channel: String },

    /// Subscribe a user to a private (#) channel
    Subscribe { channel: String, user: String },

    /// Unsubscribe a user from a private (#) channel
    Unsubscribe { channel: String, user: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.log_level, cli.json_logs)?;

    match &cli.command {
        Commands::Token {
            user,
            algo,
            key_file,
        } => {
            let token = tokens::generate(user, *algo, cli.secret.as_deref(), key_file.as_deref())?;
            println!("{}", token);
        }

        Commands::Decode {
            token,
            algo,
            key_file,
        } => {
            let (header, payload, verified) =
                tokens::inspect(token, *algo, cli.secret.as_deref(), key_file.as_deref())?;

            println!("{} {}", "Header:".bold(), serde_json::to_string(&header)?);
            println!("{} {}", "Payload:".bold(), serde_json::to_string_pretty(&payload)?);
            if verified {
                println!("{} signature valid", "✓".green());
            } else {
                println!("{} signature not checked", "!".yellow());
            }
        }

        Commands::Register { name, key } => {
            let mut ws = connect(&cli, false)?;
            let secret = ws.register_namespace(name, key)?;
            println!(
                "{} Registered namespace {}",
                "FireWS".cyan().bold(),
                name.green()
            );
            println!("{}", secret);
        }

        Commands::Send {
            channel,
            data,
            user,
        } => {
            let mut ws = connect(&cli, true)?;
            let res = ws.send(channel, &parse_data(data), user.as_deref())?;
            print_response(&res)?;
        }

        Commands::Set {
            channel,
            data,
            user,
            ttl,
            emit,
        } => {
            let mut ws = connect(&cli, true)?;
            let data = parse_data(data);
            if *emit {
                let ok = ws.set_and_send(channel, &data, user.as_deref(), *ttl)?;
                print_flag("set", channel, ok);
            } else {
                let res = ws.set(channel, &data, user.as_deref(), *ttl)?;
                print_response(&res)?;
            }
        }

        Commands::Push {
            channel,
            data,
            user,
            ttl,
            emit,
        } => {
            let mut ws = connect(&cli, true)?;
            let data = parse_data(data);
            if *emit {
                let ok = ws.push_and_send(channel, &data, user.as_deref(), *ttl)?;
                print_flag("push", channel, ok);
            } else {
                let res = ws.push(channel, &data, user.as_deref(), *ttl)?;
                print_response(&res)?;
            }
        }

        Commands::Get { channel, user } => {
            let mut ws = connect(&cli, true)?;
            let res = ws.get(channel, user.as_deref())?;
            print_response(&res)?;
        }

        Commands::Info { channel } => {
            let mut ws = connect(&cli, true)?;
            let res = ws.channel_info(channel)?;
            print_response(&res)?;
        }

        Commands::Subscribe { channel, user } => {
            let mut ws = connect(&cli, true)?;
            let ok = ws.subscribe(channel, user)?;
            print_flag("subscribe", channel, ok);
        }

        Commands::Unsubscribe { channel, user } => {
            let mut ws = connect(&cli, true)?;
            let ok = ws.unsubscribe(channel, user)?;
            print_flag("unsubscribe", channel, ok);
        }
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

/// Connect using the config file plus flag overrides.
///
/// With `auth` set, configured credentials are used to authenticate first.
fn connect(cli: &Cli, auth: bool) -> Result<FireWs> {
    let loaded = config::load(cli.config.as_deref())?;
    let mut settings = config::apply(
        loaded,
        config::Overrides {
            address: cli.address.clone(),
            namespace: cli.namespace.clone(),
            secret: cli.secret.clone(),
            timeout_ms: cli.timeout_ms,
        },
    );
    if !auth {
        settings.namespace = None;
    }
    debug!(address = %settings.address, "connecting");

    FireWsBuilder::from_config(&settings)
        .connect()
        .with_context(|| format!("Failed to connect to {}", settings.address))
}

/// Parse a data argument as JSON, falling back to a JSON string
fn parse_data(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_response(res: &Response) -> Result<()> {
    let status = if res.success {
        "ok".green().bold()
    } else {
        "failed".red().bold()
    };
    eprintln!("{} {}", "FireWS".cyan().bold(), status);
    println!("{}", serde_json::to_string_pretty(res)?);
    Ok(())
}

fn print_flag(action: &str, channel: &str, ok: bool) {
    if ok {
        println!("{} {} {}", "✓".green(), action, channel);
    } else {
        println!("{} {} {} refused", "✗".red(), action, channel);
    }
}
