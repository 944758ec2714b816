//! TickerHug - OKX account digest over SMS.

mod config;
mod http_server;
mod runner;

use clap::Parser;
use config::AppConfig;
use runner::DigestRunner;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// TickerHug CLI
#[derive(Parser, Debug)]
#[command(name = "tickerhug")]
#[command(about = "Sends an OKX account digest by SMS", long_about = None)]
struct Args {
    /// Port for the HTTP trigger server
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Run a single digest and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Also run a digest every SECS seconds while serving
    #[arg(long, value_name = "SECS")]
    every: Option<u64>,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run_scheduler(runner: Arc<DigestRunner>, period: Duration) {
    info!("Scheduling a digest every {}s", period.as_secs());

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = runner.run_once().await {
            warn!(error = %e, "Scheduled digest run failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    warn!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_logging(&args.log_level);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 TickerHug starting...");
    info!("  Channel: {}", config.sms.channel);
    info!("  Instruments: {}", config.exchange.instruments.join(", "));
    info!("  Fetch timeout: {}s", config.fetch_timeout.as_secs());

    let runner = match DigestRunner::from_config(&config) {
        Ok(runner) => Arc::new(runner),
        Err(e) => {
            error!("Failed to initialise: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("  Message budget: {} chars", runner.budget().max_chars());

    if args.once {
        return match runner.run_once().await {
            Ok(report) => {
                info!(
                    "Digest sent via {} ({} chars)",
                    runner.channel_name(),
                    report.message.chars().count()
                );
                println!("{}", report.message);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Digest run failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let scheduler = match args.every {
        Some(0) => {
            error!("--every must be at least 1 second");
            return ExitCode::FAILURE;
        }
        Some(secs) => {
            let runner = runner.clone();
            Some(tokio::spawn(async move {
                run_scheduler(runner, Duration::from_secs(secs)).await;
            }))
        }
        None => None,
    };

    info!("Press Ctrl+C to stop...");
    let result = http_server::serve(runner, args.port, shutdown_signal()).await;

    if let Some(handle) = scheduler {
        handle.abort();
    }

    match result {
        Ok(()) => {
            info!("👋 TickerHug stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Trigger server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["tickerhug"]).unwrap();
        assert!(!args.once);
        assert_eq!(args.every, None);
    }

    #[test]
    fn test_args_run_modes() {
        let args = Args::try_parse_from(["tickerhug", "--once", "-l", "debug"]).unwrap();
        assert!(args.once);
        assert_eq!(args.log_level, "debug");

        let args = Args::try_parse_from(["tickerhug", "--every", "3600", "-p", "8080"]).unwrap();
        assert_eq!(args.every, Some(3600));
        assert_eq!(args.port, 8080);
    }
}
