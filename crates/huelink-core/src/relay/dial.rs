// ── Relay dialing ──
//
// Establishing the websocket is behind a trait so the session manager can
// be driven over in-memory transports.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use crate::error::CoreError;

/// Opens websocket connections to the relay.
pub trait Dial: Send + Sync + 'static {
    /// Byte stream underneath the websocket.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Perform the handshake against `url`.
    fn dial(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<WebSocketStream<Self::Stream>, CoreError>> + Send;
}

/// Dials over TCP, with TLS for `wss://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsDialer;

impl Dial for WsDialer {
    type Stream = MaybeTlsStream<TcpStream>;

    async fn dial(&self, url: &Url) -> Result<WebSocketStream<Self::Stream>, CoreError> {
        let (ws, response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| CoreError::Dial {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        debug!(status = %response.status(), "relay handshake complete");
        Ok(ws)
    }
}
