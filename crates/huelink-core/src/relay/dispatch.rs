// ── Inbound message handlers ──

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use super::pump::broadcast_snapshot;
use super::session::SessionWriter;
use crate::bridge::Bridge;
use crate::error::CoreError;
use crate::protocol::Envelope;
use crate::provider::DeviceGroupProvider;

/// Act on one decoded inbound envelope.
///
/// Only a failed write is returned as an error; everything else is
/// handled and logged here.
pub(crate) async fn dispatch<S, P>(
    envelope: Envelope,
    writer: &SessionWriter<S>,
    bridge: &Bridge<P>,
) -> Result<(), CoreError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: DeviceGroupProvider,
{
    match envelope {
        Envelope::Status => {
            debug!("status requested");
            broadcast_snapshot(writer, bridge).await
        }
        Envelope::Update(cmd) => {
            let matched = bridge.apply_update(&cmd).await;
            debug!(group = %cmd.group, matched, is_on = cmd.is_on, brightness = ?cmd.brightness, "update applied");
            if matched == 0 {
                return Ok(());
            }
            broadcast_snapshot(writer, bridge).await
        }
        // Outbound-only; a relay echoing our own snapshots back is harmless.
        Envelope::GroupState(_) => {
            debug!("ignoring inbound group_state");
            Ok(())
        }
        Envelope::Unknown { kind } => {
            info!(kind = %kind, "ignoring unknown message type");
            Ok(())
        }
    }
}
