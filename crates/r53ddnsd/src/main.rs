// # r53ddnsd - Route 53 DDNS Daemon
//
// The r53ddnsd daemon is a thin integration layer. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP IP source and the Route 53 provider into the engine
// 4. Running the engine until SIGTERM or SIGINT
//
// All reconciliation logic lives in r53ddns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `CONFIG_R53DDNS_HOSTNAME`: Hostname to keep updated (required)
// - `CONFIG_R53DDNS_IPURL`: Service that echoes the public IP (required)
// - `CONFIG_R53DDNS_INTERVAL_SECS`: Seconds between cycles (default 300)
// - `CONFIG_R53DDNS_TIMEOUT_SECS`: Per-request timeout (default 10)
// - `CONFIG_R53DDNS_MODE`: `live` or `dry-run` (default live)
// - `CONFIG_R53DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// AWS credentials and region come from the standard AWS environment chain.
//
// ## Example
//
// ```bash
// export CONFIG_R53DDNS_HOSTNAME=home.example.com
// export CONFIG_R53DDNS_IPURL=https://checkip.amazonaws.com
// export AWS_PROFILE=dns-updater
//
// r53ddnsd
// ```

use anyhow::{Context, Result};
use r53ddns_core::{DdnsConfig, DdnsEngine, EngineEvent};
use r53ddns_ip_http::HttpIpSource;
use r53ddns_provider_route53::Route53Provider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const LOG_LEVEL_ENV: &str = "CONFIG_R53DDNS_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn parse_log_level(value: &str) -> Option<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn main() -> ExitCode {
    // Logging comes first so configuration errors are logged too
    let requested_level = env::var(LOG_LEVEL_ENV).ok().filter(|v| !v.is_empty());
    let log_level = requested_level
        .as_deref()
        .map_or(Some(Level::INFO), parse_log_level);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level.unwrap_or(Level::INFO))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if log_level.is_none() {
        error!(
            "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            LOG_LEVEL_ENV,
            requested_level.unwrap_or_default()
        );
        return DdnsExitCode::ConfigError.into();
    }

    let config = match DdnsConfig::from_env().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("Starting r53ddnsd daemon");
    info!(
        "Managing {} via {} (interval {}s, timeout {}s, mode {:?})",
        config.hostname, config.ip_url, config.interval_secs, config.timeout_secs, config.mode
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    let ip_source = HttpIpSource::new(config.ip_url.clone(), config.timeout())
        .context("Failed to create IP source")?;
    let provider = Route53Provider::from_env(config.timeout(), config.is_dry_run()).await;

    let (engine, mut events) = DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)
        .context("Failed to create engine")?;

    // Nothing else consumes engine events in the daemon
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::Stopped { reason } => {
                    debug!("Engine stopped: {}", reason);
                    break;
                }
                other => debug!("Engine event: {:?}", other),
            }
        }
    });

    let shutdown = shutdown_signal()?;
    engine.run_until_shutdown(shutdown).await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Install SIGTERM and SIGINT handlers
///
/// Handlers are installed before the engine starts; the returned future
/// resolves on the first signal.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", received);
    })
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}
