use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use remote_notify::client;
use remote_notify::config::Config;
use remote_notify::notifier;
use remote_notify::protocol::Notification;
use remote_notify::server;

/// Remote Notify - relay desktop notifications between hosts
///
/// Launch with --server to display messages; otherwise sends one.
#[derive(Parser)]
#[command(name = "remote-notify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run as the receiving server instead of sending
    #[arg(long)]
    server: bool,

    /// Send with low priority
    #[arg(long)]
    low: bool,

    /// Send with normal priority (the default)
    #[arg(long)]
    normal: bool,

    /// Send with critical priority
    #[arg(long)]
    critical: bool,

    /// Target host; overrides the config file
    #[arg(long, env = "REMOTE_NOTIFY_HOST")]
    host: Option<String>,

    /// Canonical TCP port; overrides the config file
    #[arg(long, env = "REMOTE_NOTIFY_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// <source> <title> <message>
    #[arg(value_names = ["SOURCE", "TITLE", "MESSAGE"])]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };
    if let Some(host) = cli.host.clone() {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    if cli.server {
        run_server(config)
    } else {
        run_client(&cli, &config)
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn run_server(config: Config) -> Result<()> {
    // Backend problems are fatal here, before the accept loop starts
    let notifier = notifier::create_notifier().context("Cannot start notification server")?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::run(config, notifier))
}

fn run_client(cli: &Cli, config: &Config) -> Result<()> {
    // Anything other than <source> <title> <message> is a silent no-op
    if cli.args.len() != 3 {
        tracing::debug!(
            "Expected <source> <title> <message>, got {} arguments; nothing sent",
            cli.args.len()
        );
        return Ok(());
    }

    let priority = client::resolve_priority(cli.low, cli.normal, cli.critical);
    let notification = Notification::new(
        priority.as_str(),
        &cli.args[0],
        &cli.args[1],
        &cli.args[2],
    );

    client::send(&config.host, config.port, &notification)?;
    info!("Notification sent to {}:{}", config.host, config.port);
    Ok(())
}
