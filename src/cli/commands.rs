//! CLI command implementations
//!
//! Long-running commands build a tokio runtime, install a shutdown signal
//! and block until it fires. `drain` runs synchronously and exits.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use crate::drain::DrainLoop;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::init_tracing;
use crate::spool::{DrainLease, DrainOutcome, DrainReport, Spool};

/// Parse arguments, resolve configuration and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::resolve(cli.command.common())?;
    init_tracing(&config.log_level).map_err(CliError::boot_failed)?;
    run_command(cli.command, &config)
}

/// Run a parsed command against a resolved configuration
pub fn run_command(command: Command, config: &Config) -> CliResult<()> {
    match command {
        Command::Ingest { port, .. } => ingest(config, port),
        Command::Worker { port, .. } => worker(config, port),
        Command::Serve { port, .. } => serve(config, port),
        Command::Drain { .. } => drain_once(config).map(|_| ()),
    }
}

/// Serve `POST /logs` until interrupted.
pub fn ingest(config: &Config, port: Option<u16>) -> CliResult<()> {
    let spool = open_spool(config)?;
    let server = HttpServer::ingest(listener(&config.ingest, port), spool);

    runtime()?.block_on(async {
        let shutdown = CancellationToken::new();
        tokio::spawn(cancel_on_signal(shutdown.clone()));
        server
            .start(shutdown)
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Run the drain loop and the health endpoint until interrupted.
pub fn worker(config: &Config, port: Option<u16>) -> CliResult<()> {
    let spool = open_spool(config)?;
    let drain_loop = DrainLoop::new(
        Arc::clone(&spool),
        config.build_sink(),
        config.drain.clone(),
    )?;
    let server = HttpServer::worker(listener(&config.worker, port), Arc::clone(spool.metrics()));

    runtime()?.block_on(run_with_drain(server, drain_loop))
}

/// Ingestion and draining in one process, on one listener.
pub fn serve(config: &Config, port: Option<u16>) -> CliResult<()> {
    let spool = open_spool(config)?;
    let drain_loop = DrainLoop::new(
        Arc::clone(&spool),
        config.build_sink(),
        config.drain.clone(),
    )?;
    let server = HttpServer::combined(listener(&config.ingest, port), spool);

    runtime()?.block_on(run_with_drain(server, drain_loop))
}

/// One drain, recovery included, under the drain lease.
///
/// A sink failure is an error: the batch stays in the processing file and
/// the next run retries it.
pub fn drain_once(config: &Config) -> CliResult<DrainReport> {
    let spool = open_spool(config)?;
    let _lease = DrainLease::acquire(spool.layout())?;
    let sink = config.build_sink();

    match spool.drain(sink.as_ref())? {
        DrainOutcome::Idle => {
            info!("nothing to drain");
            Ok(DrainReport::default())
        }
        DrainOutcome::Delivered(report) => {
            info!(
                delivered = report.delivered,
                corrupt = report.corrupt_lines,
                recovered = report.recovered_batches,
                "drain complete"
            );
            Ok(report)
        }
        DrainOutcome::SinkFailed {
            report,
            retained,
            error,
        } => Err(CliError::sink_failed(format!(
            "{} ({} entries retained, {} delivered before the failure)",
            error, retained, report.delivered
        ))),
    }
}

async fn run_with_drain(server: HttpServer, drain_loop: DrainLoop) -> CliResult<()> {
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let drain = tokio::spawn(drain_loop.run(shutdown.clone()));
    let served = server.start(shutdown.clone()).await;

    // A listener that fails to start takes the drainer down with it
    shutdown.cancel();
    drain
        .await
        .map_err(|e| CliError::boot_failed(format!("drain task failed: {}", e)))?;

    served.map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

fn open_spool(config: &Config) -> CliResult<Arc<Spool>> {
    let spool = Spool::open(config.spool_config())?;
    info!(data_dir = %config.data_dir.display(), fsync = config.fsync, "spool opened");
    Ok(Arc::new(spool))
}

fn listener(base: &HttpServerConfig, port: Option<u16>) -> HttpServerConfig {
    let mut config = base.clone();
    if let Some(port) = port {
        config.port = port;
    }
    config
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Cancels `token` on SIGINT or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => return,
    }

    info!("shutdown signal received");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::SinkConfig;
    use crate::entry::LogEntry;
    use crate::spool::SpoolConfig;
    use std::fs;
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().join("data"),
            sink: SinkConfig::File {
                path: temp_dir.path().join("out.jsonl"),
            },
            ..Config::default()
        }
    }

    fn enqueue(config: &Config, messages: &[&str]) {
        let spool = Spool::open(SpoolConfig::new(&config.data_dir)).unwrap();
        for message in messages {
            spool
                .enqueue(&LogEntry::new("api", "info", *message, "2026-10-19T08:30:00Z"))
                .unwrap();
        }
    }

    #[test]
    fn test_drain_once_delivers_to_file_sink() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        enqueue(&config, &["a", "b"]);

        let report = drain_once(&config).unwrap();
        assert_eq!(report.delivered, 2);

        let out = fs::read_to_string(temp_dir.path().join("out.jsonl")).unwrap();
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_drain_once_on_empty_spool() {
        let temp_dir = TempDir::new().unwrap();
        let report = drain_once(&config(&temp_dir)).unwrap();
        assert_eq!(report, DrainReport::default());
    }

    #[test]
    fn test_drain_once_refuses_second_drainer() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        enqueue(&config, &["a"]);

        let spool = Spool::open(config.spool_config()).unwrap();
        let _held = DrainLease::acquire(spool.layout()).unwrap();

        let err = drain_once(&config).unwrap_err();
        assert_eq!(err.code_str(), "LOGSPOOL_CLI_DRAINER_BUSY");
    }

    #[test]
    fn test_listener_port_override() {
        let base = HttpServerConfig::worker_default();
        assert_eq!(listener(&base, None).port, 8081);
        assert_eq!(listener(&base, Some(9100)).port, 9100);
    }
}
