use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use plex_remote_health::config::ProbeConfig;
use plex_remote_health::monitor::{HealthCheckService, HttpProber};
use plex_remote_health::notifications::PushoverSender;
use plex_remote_health::status_store::FileStatusStore;
use plex_remote_health::version::VERSION;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Probe a remote media server and push an alert when its status changes")]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Human-readable logs go to stderr so stdout carries only the result.
/// With a log directory, a daily-rotated JSON log is written as well.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (file_writer, guard) =
                tracing_appender::non_blocking(rolling::daily(dir, "plex-remote-health.log"));
            let layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false) // No ANSI colors in file
                .json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    guard
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match ProbeConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };
    let _log_guard = init_logging(config.log_dir.as_deref());
    info!(version = VERSION, url = %config.check_url, status_param = %config.status_param, "Starting health probe.");

    let prober = HttpProber::new(
        &config.check_url,
        &config.expected_marker,
        config.probe_timeout,
    )?;
    let store = FileStatusStore::new(&config.data_dir, &config.status_param)?;
    let sender = PushoverSender::new(config.pushover.clone())?;
    let service = HealthCheckService::new(prober, store, sender, config.alert_policy());

    let outcome = match service.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Health check failed.");
            return Err(e.into());
        }
    };

    info!(previous = %outcome.previous, current = %outcome.current, http_code = outcome.http_code, "Health check complete.");
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
