//! Relay session manager.
//!
//! Keeps one websocket session to the relay alive for the life of the
//! process: dial, run the read and write pumps until either stops, close,
//! wait, dial again. Dial failures and broken sessions are retried forever
//! after a fixed delay; only cancellation ends the loop.
//!
//! ```rust,ignore
//! let cancel = CancellationToken::new();
//! let relay = RelayHandle::spawn(RelayConfig::default(), bridge, WsDialer, cancel.clone())?;
//! let mut status = relay.status();
//! // ...
//! relay.shutdown().await;
//! ```

mod dial;
mod dispatch;
mod pump;
mod session;

use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub use dial::{Dial, WsDialer};
pub use session::{SessionInfo, SessionWriter};

use self::pump::{read_pump, write_pump};
use self::session::Session;
use crate::bridge::Bridge;
use crate::config::RelayConfig;
use crate::error::CoreError;
use crate::provider::DeviceGroupProvider;

// ── Observable status ────────────────────────────────────────────────

/// Lifecycle of the relay connection: `Idle → Dialing → Connected →
/// Closing → Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Dialing,
    Connected,
    Closing,
}

/// Snapshot of the session manager, published on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub state: SessionState,
    /// The live session, while one exists.
    pub session: Option<SessionInfo>,
    /// Why the previous dial or session failed.
    pub last_error: Option<String>,
    /// Sessions established since start.
    pub sessions_started: u64,
}

// ── Handle ───────────────────────────────────────────────────────────

/// Handle to the background session manager task.
pub struct RelayHandle {
    status: watch::Receiver<RelayStatus>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Validate the relay address and spawn the session manager.
    ///
    /// The first dial happens asynchronously; watch [`status`](Self::status)
    /// to follow it.
    pub fn spawn<P, D>(
        config: RelayConfig,
        bridge: Bridge<P>,
        dialer: D,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError>
    where
        P: DeviceGroupProvider,
        D: Dial,
    {
        let url = config.url()?;
        let (status_tx, status) = watch::channel(RelayStatus::default());
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            supervise(url, &config, &bridge, &dialer, &status_tx, &task_cancel).await;
        });

        Ok(Self {
            status,
            cancel,
            task,
        })
    }

    /// Subscribe to status transitions.
    pub fn status(&self) -> watch::Receiver<RelayStatus> {
        self.status.clone()
    }

    /// The most recently published status.
    pub fn current(&self) -> RelayStatus {
        self.status.borrow().clone()
    }

    /// Cancel the session manager and wait for it to close the transport.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "relay task ended abnormally");
        }
    }
}

/// Run the session manager on the current task until `cancel` fires.
///
/// Fails only when the configured relay address cannot form a URL.
pub async fn run<P, D>(
    config: RelayConfig,
    bridge: Bridge<P>,
    dialer: D,
    status: watch::Sender<RelayStatus>,
    cancel: CancellationToken,
) -> Result<(), CoreError>
where
    P: DeviceGroupProvider,
    D: Dial,
{
    let url = config.url()?;
    supervise(url, &config, &bridge, &dialer, &status, &cancel).await;
    Ok(())
}

// ── Supervision loop ─────────────────────────────────────────────────

/// Why a session stopped.
enum SessionEnd {
    Cancelled,
    PeerClosed,
    Failed(CoreError),
}

async fn supervise<P, D>(
    url: Url,
    config: &RelayConfig,
    bridge: &Bridge<P>,
    dialer: &D,
    status: &watch::Sender<RelayStatus>,
    cancel: &CancellationToken,
) where
    P: DeviceGroupProvider,
    D: Dial,
{
    let mut session_id: u64 = 0;
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        status.send_modify(|s| s.state = SessionState::Dialing);
        info!(url = %url, attempt, "dialing relay");

        let dialed = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = dialer.dial(&url) => result,
        };

        match dialed {
            Err(e) => {
                warn!(error = %e, attempt, delay_ms = millis(config.retry_delay), "relay dial failed");
                status.send_modify(|s| {
                    s.state = SessionState::Idle;
                    s.last_error = Some(e.to_string());
                });
            }
            Ok(ws) => {
                attempt = 0;
                session_id += 1;
                let mut session = Session::new(session_id, &url, ws);
                status.send_modify(|s| {
                    s.state = SessionState::Connected;
                    s.session = Some(session.info.clone());
                    s.sessions_started += 1;
                });
                info!(session = session_id, "relay session established");

                let end = run_session(&mut session, bridge, config.broadcast_interval, cancel).await;

                status.send_modify(|s| s.state = SessionState::Closing);
                session.writer.close().await;
                drop(session);

                let last_error = match end {
                    SessionEnd::Cancelled => {
                        debug!(session = session_id, "relay session cancelled");
                        None
                    }
                    SessionEnd::PeerClosed => {
                        info!(session = session_id, "relay session closed by peer");
                        None
                    }
                    SessionEnd::Failed(e) => {
                        warn!(session = session_id, error = %e, "relay session failed");
                        Some(e.to_string())
                    }
                };
                status.send_modify(|s| {
                    s.state = SessionState::Idle;
                    s.session = None;
                    if last_error.is_some() {
                        s.last_error = last_error;
                    }
                });

                if cancel.is_cancelled() {
                    break;
                }
                debug!(delay_ms = millis(config.retry_delay), "waiting before redial");
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(config.retry_delay) => {}
        }
    }

    status.send_modify(|s| {
        s.state = SessionState::Idle;
        s.session = None;
    });
    debug!("relay session manager stopped");
}

/// Drive both pumps until one of them stops or `cancel` fires.
async fn run_session<S, P>(
    session: &mut Session<S>,
    bridge: &Bridge<P>,
    interval: Duration,
    cancel: &CancellationToken,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: DeviceGroupProvider,
{
    let Session { reader, writer, .. } = session;

    tokio::select! {
        biased;
        () = cancel.cancelled() => SessionEnd::Cancelled,
        result = read_pump(reader, writer, bridge) => match result {
            Ok(()) => SessionEnd::PeerClosed,
            Err(e) => SessionEnd::Failed(e),
        },
        e = write_pump(writer, bridge, interval) => SessionEnd::Failed(e),
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
