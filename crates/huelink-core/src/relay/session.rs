// ── Relay session ──
//
// One established websocket connection. The reading half belongs to the
// read pump; the writing half sits behind a mutex so every frame is
// written whole, whichever pump sends it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::SinkExt;
use futures_util::stream::{SplitSink, SplitStream, StreamExt};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

use crate::error::CoreError;
use crate::protocol::Envelope;

/// Upper bound on sending the close frame during teardown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Public description of a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Monotonic per-process session number, starting at 1.
    pub id: u64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) struct Session<S> {
    pub(crate) info: SessionInfo,
    pub(crate) reader: SplitStream<WebSocketStream<S>>,
    pub(crate) writer: SessionWriter<S>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(id: u64, url: &Url, ws: WebSocketStream<S>) -> Self {
        let (sink, reader) = ws.split();
        Self {
            info: SessionInfo {
                id,
                url: url.to_string(),
                created_at: Utc::now(),
            },
            reader,
            writer: SessionWriter::new(sink),
        }
    }
}

// ── Writer ───────────────────────────────────────────────────────────

struct WriterState<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
    closed: bool,
}

/// Serialized access to the outbound half of a session.
pub struct SessionWriter<S> {
    state: Mutex<WriterState<S>>,
}

impl<S> SessionWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(sink: SplitSink<WebSocketStream<S>, Message>) -> Self {
        Self {
            state: Mutex::new(WriterState {
                sink,
                closed: false,
            }),
        }
    }

    /// Encode and write one envelope as a single text frame.
    pub async fn send(&self, envelope: &Envelope) -> Result<(), CoreError> {
        let frame = envelope.encode();
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(CoreError::Transport("session is closed".into()));
        }
        state.sink.send(Message::text(frame)).await?;
        debug!(kind = envelope.kind(), "frame sent");
        Ok(())
    }

    /// Send a close frame and shut the sink. Safe to call more than once;
    /// failures are logged and otherwise ignored.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;
        match tokio::time::timeout(CLOSE_TIMEOUT, state.sink.close()).await {
            Ok(Ok(())) => debug!("session transport closed"),
            Ok(Err(e)) => debug!(error = %e, "error closing session transport"),
            Err(_) => debug!("timed out closing session transport"),
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use tokio_tungstenite::tungstenite::protocol::Role;

    use super::*;
    use crate::model::DeviceGroup;

    async fn pair() -> (WebSocketStream<tokio::io::DuplexStream>, WebSocketStream<tokio::io::DuplexStream>) {
        let (a, b) = tokio::io::duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(a, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(b, Role::Server, None).await;
        (client, server)
    }

    #[tokio::test]
    async fn concurrent_sends_produce_whole_frames() {
        let (client, mut server) = pair().await;
        let (sink, _reader) = client.split();
        let writer = Arc::new(SessionWriter::new(sink));

        let big: Vec<DeviceGroup> = (0..200)
            .map(|i| DeviceGroup::new(i.to_string(), format!("Group {i}"), i % 2 == 0, 42))
            .collect();

        let mut tasks = Vec::new();
        for n in 0..8 {
            let writer = Arc::clone(&writer);
            let envelope = if n % 2 == 0 {
                Envelope::group_state(big.clone())
            } else {
                Envelope::Status
            };
            tasks.push(tokio::spawn(async move { writer.send(&envelope).await }));
        }

        let reader = tokio::spawn(async move {
            let mut frames = Vec::new();
            while frames.len() < 8 {
                match server.next().await {
                    Some(Ok(Message::Text(text))) => frames.push(text.as_str().to_owned()),
                    other => panic!("unexpected frame: {other:?}"),
                }
            }
            frames
        });

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        let frames = reader.await.unwrap();

        let mut group_states = 0;
        for frame in &frames {
            match Envelope::decode(frame).unwrap() {
                Envelope::GroupState(msg) => {
                    assert_eq!(msg.groups, big);
                    group_states += 1;
                }
                Envelope::Status => {}
                other => panic!("unexpected envelope {other:?}"),
            }
        }
        assert_eq!(group_states, 4);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_later_sends() {
        let (client, mut server) = pair().await;
        let (sink, _reader) = client.split();
        let writer = SessionWriter::new(sink);

        writer.close().await;
        writer.close().await;
        assert!(writer.is_closed().await);

        let err = writer.send(&Envelope::Status).await.unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));

        assert!(matches!(server.next().await, Some(Ok(Message::Close(_)))));
    }
}
