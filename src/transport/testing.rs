//! In-memory remote end for transport tests.
//!
//! Pairs a client-role WebSocket with a server-role [`MockPeer`] over a
//! `tokio::io::duplex` pipe, so tests can script the remote side frame
//! by frame without opening a socket.

use std::sync::Once;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{DuplexStream, duplex};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::Role;

/// Client half handed to the code under test.
pub(crate) type ClientStream = WebSocketStream<DuplexStream>;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Scripted remote end.
pub(crate) struct MockPeer {
    ws: WebSocketStream<DuplexStream>,
}

/// Installs a test subscriber once; filter with `RUST_LOG`.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Returns a connected (client stream, remote peer) pair.
pub(crate) async fn connected() -> (ClientStream, MockPeer) {
    init_tracing();
    let (client_io, server_io) = duplex(PIPE_CAPACITY);
    let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
    let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
    (client, MockPeer { ws: server })
}

impl MockPeer {
    /// Reads the next message, skipping control frames.
    pub(crate) async fn next_message(&mut self) -> Option<Message> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(message) => return Some(message),
                Err(_) => return None,
            }
        }
    }

    /// Reads the next request frame as JSON.
    pub(crate) async fn recv_request(&mut self) -> Value {
        match self.next_message().await {
            Some(Message::Text(text)) => {
                serde_json::from_str(text.as_str()).expect("request frame is valid JSON")
            }
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    /// Sends a JSON value as a text frame.
    pub(crate) async fn send_json(&mut self, value: Value) {
        self.try_send_json(value).await.expect("peer send failed");
    }

    /// Sends a JSON value, reporting failure instead of panicking.
    pub(crate) async fn try_send_json(
        &mut self,
        value: Value,
    ) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        self.ws.send(Message::Text(value.to_string().into())).await
    }

    /// Sends raw text, which need not be valid JSON.
    pub(crate) async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_owned().into()))
            .await
            .expect("peer send failed");
    }

    /// Sends raw bytes as a binary frame.
    pub(crate) async fn send_binary(&mut self, bytes: &[u8]) {
        self.ws
            .send(Message::Binary(bytes.to_vec().into()))
            .await
            .expect("peer send failed");
    }

    /// Sends a Close frame.
    pub(crate) async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}
