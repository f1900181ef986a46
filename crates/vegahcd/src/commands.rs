//! Subcommand wiring: which checks run against which endpoints, and the
//! daemon lifecycle that drives them.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};
use vegahc_checks::{
    block_increase, block_increase_blocking, clock_skew, core_online, data_node_lag,
    data_node_online, explorer_online, explorer_transactions, CheckContext, HealthCheck,
};
use vegahc_monitor::HealthMonitor;
use vegahc_probe::ProbeClient;

use crate::config::Settings;

/// The deployment being monitored, with its resolved endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Service {
    Vega {
        core_url: String,
    },
    DataNode {
        core_url: String,
        data_node_url: String,
    },
    BlockExplorer {
        core_url: String,
        explorer_url: String,
        data_node_url: Option<String>,
    },
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Vega { .. } => "vega",
            Service::DataNode { .. } => "data-node",
            Service::BlockExplorer { .. } => "blockexplorer",
        }
    }
}

/// Build the ordered check set for `service`.
pub fn build_checks(service: &Service, settings: &Settings, ctx: &CheckContext) -> Vec<Box<dyn HealthCheck>> {
    match service {
        Service::Vega { core_url } => vec![
            core_online(core_url, ctx),
            clock_skew(core_url, ctx),
            block_check(core_url, settings, ctx),
        ],
        Service::DataNode {
            core_url,
            data_node_url,
        } => vec![
            core_online(core_url, ctx),
            clock_skew(core_url, ctx),
            data_node_online(data_node_url, ctx),
            block_check(core_url, settings, ctx),
            data_node_lag(core_url, data_node_url, ctx),
        ],
        Service::BlockExplorer {
            core_url,
            explorer_url,
            data_node_url,
        } => {
            let mut checks = vec![
                core_online(core_url, ctx),
                clock_skew(core_url, ctx),
                block_check(core_url, settings, ctx),
                explorer_online(explorer_url, ctx),
                explorer_transactions(explorer_url, ctx),
            ];
            if let Some(data_node_url) = data_node_url {
                checks.push(data_node_online(data_node_url, ctx));
                checks.push(data_node_lag(core_url, data_node_url, ctx));
            }
            checks
        }
    }
}

fn block_check(core_url: &str, settings: &Settings, ctx: &CheckContext) -> Box<dyn HealthCheck> {
    if settings.blocking_block_check {
        block_increase_blocking(core_url, settings.block_increase_period, ctx)
    } else {
        block_increase(core_url, settings.block_increase_period, ctx)
    }
}

/// Run the daemon until a shutdown signal arrives.
pub async fn run(service: Service, settings: Settings) -> anyhow::Result<()> {
    info!(service = service.name(), "vega health check starting");

    let ctx = CheckContext::new(
        ProbeClient::with_timeout(settings.probe_timeout),
        settings.thresholds,
    );
    let monitor = HealthMonitor::new(build_checks(&service, &settings, &ctx), settings.check_interval);
    info!(
        checks = ?monitor.check_names(),
        interval = ?settings.check_interval,
        "health monitor initialized"
    );

    // ── Bind before spawning anything ──────────────────────────

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind health check server on {addr}"))?;

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // ── Start monitor and server ───────────────────────────────

    let (store, handle) = monitor.start(shutdown_rx.clone());
    vegahc_api::serve(listener, store, shutdown_rx).await?;

    handle.join().await;
    info!("vega health check stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
