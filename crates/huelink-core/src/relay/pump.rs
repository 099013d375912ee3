// ── Session pumps ──
//
// Two loops share one session: the read pump decodes and dispatches
// inbound frames, the write pump broadcasts the snapshot on a fixed
// interval. Either returning means the session is finished.

use std::time::Duration;

use futures_util::stream::{SplitStream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use super::dispatch::dispatch;
use super::session::SessionWriter;
use crate::bridge::Bridge;
use crate::error::CoreError;
use crate::protocol::{CodecError, Envelope};
use crate::provider::DeviceGroupProvider;

/// Read and dispatch frames until the peer goes away or a frame cannot be
/// decoded.
///
/// Returns `Ok(())` when the peer closes or the stream ends, and the
/// failure otherwise. A payload that does not fit its message kind is
/// logged and skipped.
pub(crate) async fn read_pump<S, P>(
    reader: &mut SplitStream<WebSocketStream<S>>,
    writer: &SessionWriter<S>,
    bridge: &Bridge<P>,
) -> Result<(), CoreError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: DeviceGroupProvider,
{
    loop {
        let frame = match reader.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => return Err(e.into()),
            None => {
                info!("relay stream ended");
                return Ok(());
            }
        };

        match frame {
            Message::Text(text) => match Envelope::decode(text.as_str()) {
                Ok(envelope) => dispatch(envelope, writer, bridge).await?,
                Err(CodecError::Payload { kind, source }) => {
                    warn!(kind = %kind, error = %source, "dropping message with invalid payload");
                }
                Err(e) => return Err(e.into()),
            },
            Message::Close(frame) => {
                match frame {
                    Some(cf) => info!(code = %cf.code, reason = %cf.reason, "relay closed the session"),
                    None => info!("relay closed the session"),
                }
                return Ok(());
            }
            Message::Ping(_) | Message::Pong(_) => trace!("control frame"),
            Message::Binary(data) => debug!(len = data.len(), "ignoring binary frame"),
            Message::Frame(_) => {}
        }
    }
}

/// Broadcast the snapshot now, then every `interval`, until a write fails.
pub(crate) async fn write_pump<S, P>(
    writer: &SessionWriter<S>,
    bridge: &Bridge<P>,
    interval: Duration,
) -> CoreError
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: DeviceGroupProvider,
{
    loop {
        if let Err(e) = broadcast_snapshot(writer, bridge).await {
            return e;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Fetch the groups (falling back to the cached snapshot) and send them
/// as one `group_state` frame.
pub(crate) async fn broadcast_snapshot<S, P>(
    writer: &SessionWriter<S>,
    bridge: &Bridge<P>,
) -> Result<(), CoreError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: DeviceGroupProvider,
{
    let groups = bridge.refresh_or_cached().await;
    writer.send(&Envelope::group_state(groups.to_vec())).await
}
