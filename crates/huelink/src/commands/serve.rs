//! `serve`: the long-running process.
//!
//! Connects to the Hue bridge, optionally starts the relay session manager,
//! and serves the local HTTP API until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use huelink_core::{Bridge, BridgeConfig, HueProvider, RelayHandle, WsDialer};

use crate::cli::{GlobalOpts, ServeArgs};
use crate::config;
use crate::error::CliError;
use crate::http::{self, AppState};

use super::pair::{self, PairOptions};

pub async fn handle(args: ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    config::apply_serve_overrides(&mut cfg, &args)?;

    let bridge_config = if args.discover {
        let paired = pair::pair_bridge(global, &PairOptions::default()).await?;
        BridgeConfig {
            address: paired.address,
            app_key: paired.app_key,
            timeout: Duration::from_secs(cfg.bridge.timeout),
        }
    } else {
        config::bridge_config(&cfg, global)?
    };

    let bridge = Bridge::new(HueProvider::new(&bridge_config)?);
    let groups = bridge.refresh().await?;
    info!(bridge = %bridge_config.address, groups = groups.len(), "connected to hue bridge");

    let cancel = CancellationToken::new();
    let relay = if cfg.relay.enabled {
        let relay_config = config::relay_config(&cfg);
        info!(url = %relay_config.url()?, "starting relay connection");
        Some(RelayHandle::spawn(
            relay_config,
            bridge.clone(),
            WsDialer,
            cancel.child_token(),
        )?)
    } else {
        info!("relay disabled; serving local API only");
        None
    };

    let state = AppState {
        bridge,
        relay: relay.as_ref().map(RelayHandle::status),
        environment: cfg.http.environment,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, env = %cfg.http.environment, "starting server");

    let served = axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await;

    cancel.cancel();
    if let Some(relay) = relay {
        relay.shutdown().await;
    }
    info!(%addr, "stopped server");

    served.map_err(|e| CliError::Server(e.to_string()))
}

/// Resolves on SIGINT, SIGTERM, or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        () = cancel.cancelled() => {},
    }
    info!("shutting down");
}
