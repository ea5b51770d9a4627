//! Client façade over a multiplexed connection.
//!
//! [`Client`] is what domain bindings program against: typed calls that
//! decode their result, and typed or raw notification listeners.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, Stream};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::warn;

use crate::error::Result;
use crate::protocol::{Command, Event, decode_result};
use crate::transport::Connection;

use super::builder::ClientBuilder;
use super::options::ClientOptions;

// ============================================================================
// Client
// ============================================================================

/// DevTools RPC client.
///
/// Cloning is cheap and every clone drives the same connection.
///
/// # Example
///
/// ```no_run
/// use devtools_rpc::Client;
/// use serde_json::{Value, json};
///
/// # async fn example() -> devtools_rpc::Result<()> {
/// let client = Client::connect("ws://127.0.0.1:9222/devtools/page/ABC").await?;
///
/// client.add_listener("Page.loadEventFired", |params: &Value| {
///     println!("loaded at {}", params["timestamp"]);
/// });
///
/// client.execute("Page.enable", ()).await?;
/// let frame: Value = client
///     .call("Page.navigate", json!({"url": "https://example.com"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    /// The multiplexed connection.
    connection: Connection,
    /// Default timeout applied to calls.
    request_timeout: Option<Duration>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("connection", &self.connection)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Creates a new [`ClientBuilder`].
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Dials `url` with default options.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::connect`].
    pub async fn connect(url: &str) -> Result<Self> {
        ClientBuilder::new().connect(url).await
    }

    /// Wraps an already established WebSocket stream with default options.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Message, WsError>>
            + Sink<Message, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        Self::from_parts(stream, ClientOptions::new())
    }

    pub(crate) fn from_parts<S>(stream: S, options: ClientOptions) -> Self
    where
        S: Stream<Item = std::result::Result<Message, WsError>>
            + Sink<Message, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        Self {
            connection: Connection::new(stream, options.max_pending_calls),
            request_timeout: options.request_timeout,
        }
    }
}

// ============================================================================
// Client - Calls
// ============================================================================

impl Client {
    /// Calls `method` and decodes its result into `R`.
    ///
    /// Pass `()` as `params` for methods without arguments.
    ///
    /// # Errors
    ///
    /// - [`Error::Remote`](crate::Error::Remote) if the remote end reported an error
    /// - [`Error::Json`](crate::Error::Json) if params or result do not (de)serialize
    /// - [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the connection closed
    /// - [`Error::RequestTimeout`](crate::Error::RequestTimeout) if a timeout is configured and hit
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let result = self.call_raw(method, params).await?;
        decode_result(result)
    }

    /// Calls `method` and returns its undecoded result.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call), minus result decoding.
    pub async fn call_raw<P>(&self, method: &str, params: P) -> Result<Value>
    where
        P: Serialize,
    {
        match self.request_timeout {
            Some(limit) => {
                self.connection
                    .send_with_timeout(method, &params, limit)
                    .await
            }
            None => self.connection.send(method, &params).await,
        }
    }

    /// Calls `method` with an explicit timeout, overriding the default.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn call_with_timeout<P, R>(
        &self,
        method: &str,
        params: P,
        timeout: Duration,
    ) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let result = self
            .connection
            .send_with_timeout(method, &params, timeout)
            .await?;
        decode_result(result)
    }

    /// Calls `method` and discards its result.
    ///
    /// # Errors
    ///
    /// Same as [`call_raw`](Self::call_raw).
    pub async fn execute<P>(&self, method: &str, params: P) -> Result<()>
    where
        P: Serialize,
    {
        self.call_raw(method, params).await.map(drop)
    }

    /// Sends a typed [`Command`] and decodes its typed response.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn command<C: Command>(&self, command: &C) -> Result<C::Response> {
        self.call(C::METHOD, command).await
    }
}

// ============================================================================
// Client - Listeners
// ============================================================================

impl Client {
    /// Registers a listener for notifications named `method`.
    ///
    /// The listener receives the undecoded `params` and runs on the read
    /// loop: it must not block waiting for a call's response, or nothing
    /// else (that response included) will be routed. Spawn a task to make
    /// calls from a listener.
    ///
    /// A listener that captures a clone of this client keeps the connection
    /// open until [`shutdown`](Self::shutdown) is called.
    pub fn add_listener<F>(&self, method: impl Into<String>, listener: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.connection.add_listener(method, Arc::new(listener));
    }

    /// Registers a typed listener for event `E`.
    ///
    /// Payloads that do not decode into `E` are logged and skipped.
    pub fn on<E, F>(&self, listener: F)
    where
        E: Event,
        F: Fn(E) + Send + Sync + 'static,
    {
        self.add_listener(E::METHOD, move |params: &Value| {
            match E::deserialize(params) {
                Ok(event) => listener(event),
                Err(e) => warn!(method = E::METHOD, error = %e, "Undecodable event payload"),
            }
        });
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Returns the number of calls awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.connection.pending_count()
    }

    /// Returns `true` once the connection has closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    /// Closes the connection; pending calls fail with
    /// [`Error::ConnectionClosed`](crate::Error::ConnectionClosed).
    pub fn shutdown(&self) {
        self.connection.shutdown();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::error::Error;
    use crate::protocol::Empty;
    use crate::transport::testing::connected;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct FooResult {
        y: i64,
    }

    #[derive(Debug, Serialize)]
    struct GetDocument {
        depth: i32,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct GetDocumentResult {
        node_id: u64,
    }

    impl Command for GetDocument {
        const METHOD: &'static str = "DOM.getDocument";
        type Response = GetDocumentResult;
    }

    #[derive(Debug, Serialize)]
    struct LogEnable {}

    impl Command for LogEnable {
        const METHOD: &'static str = "Log.enable";
        type Response = Empty;
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct FooEvent {
        n: i64,
    }

    impl Event for FooEvent {
        const METHOD: &'static str = "Foo.event";
    }

    #[tokio::test]
    async fn test_call_decodes_result() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.call::<_, FooResult>("Foo.bar", json!({"x": 1})).await }
        });

        let request = peer.recv_request().await;
        assert_eq!(request, json!({"id": 1, "method": "Foo.bar", "params": {"x": 1}}));
        peer.send_json(json!({"id": 1, "result": {"y": 2}})).await;

        assert_eq!(call.await.unwrap().unwrap(), FooResult { y: 2 });
    }

    #[tokio::test]
    async fn test_remote_error_fails_only_that_call() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.call::<_, FooResult>("Foo.bar", ()).await }
        });

        let request = peer.recv_request().await;
        assert_eq!(request["params"], Value::Null);
        peer.send_json(json!({"id": 1, "error": "boom"})).await;

        match call.await.unwrap() {
            Err(Error::Remote { message, data }) => {
                assert_eq!(message, "boom");
                assert_eq!(data, json!("boom"));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_result_decode_error_is_local() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let bad = tokio::spawn({
            let client = client.clone();
            async move { client.call::<_, FooResult>("Foo.bar", ()).await }
        });
        peer.recv_request().await;
        peer.send_json(json!({"id": 1, "result": {"y": "not a number"}})).await;
        assert!(matches!(bad.await.unwrap(), Err(Error::Json(_))));

        let good = tokio::spawn({
            let client = client.clone();
            async move { client.call::<_, FooResult>("Foo.bar", ()).await }
        });
        peer.recv_request().await;
        peer.send_json(json!({"id": 2, "result": {"y": 3}})).await;
        assert_eq!(good.await.unwrap().unwrap(), FooResult { y: 3 });
        assert!(!client.is_closed());
    }

    #[tokio::test]
    async fn test_execute_discards_result() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.execute("Log.enable", ()).await }
        });
        peer.recv_request().await;
        peer.send_json(json!({"id": 1, "result": {}})).await;

        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_typed_command() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.command(&GetDocument { depth: -1 }).await }
        });

        let request = peer.recv_request().await;
        assert_eq!(request["method"], "DOM.getDocument");
        assert_eq!(request["params"], json!({"depth": -1}));
        peer.send_json(json!({"id": 1, "result": {"nodeId": 1}})).await;

        assert_eq!(call.await.unwrap().unwrap(), GetDocumentResult { node_id: 1 });
    }

    #[tokio::test]
    async fn test_typed_command_without_result() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let call = tokio::spawn({
            let client = client.clone();
            async move { client.command(&LogEnable {}).await }
        });

        let request = peer.recv_request().await;
        assert_eq!(request["method"], "Log.enable");
        assert_eq!(request["params"], json!({}));
        peer.send_json(json!({"id": 1, "result": {}})).await;

        assert_eq!(call.await.unwrap().unwrap(), Empty);
    }

    #[tokio::test]
    async fn test_client_debug() {
        let (stream, _peer) = connected().await;
        let client = Client::new(stream);
        assert!(format!("{client:?}").starts_with("Client"));
    }

    #[tokio::test]
    async fn test_typed_listener_decodes_params() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let (tx, mut rx) = mpsc::unbounded_channel();
        client.on(move |event: FooEvent| {
            let _ = tx.send(event);
        });

        peer.send_json(json!({"method": "Foo.event", "params": {"n": "bad"}})).await;
        peer.send_json(json!({"method": "Foo.event", "params": {"n": 5}})).await;

        // The undecodable payload is skipped, so the first delivery is n == 5.
        assert_eq!(rx.recv().await.unwrap(), FooEvent { n: 5 });
    }

    #[tokio::test]
    async fn test_listener_invoked_once() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let (tx, mut rx) = mpsc::unbounded_channel();
        client.add_listener("Foo.event", move |params: &Value| {
            let _ = tx.send(params.clone());
        });

        peer.send_json(json!({"method": "Foo.event", "params": {"n": 5}})).await;

        // A round trip after the notification proves the read loop is past it.
        let sync = tokio::spawn({
            let client = client.clone();
            async move { client.execute("Foo.sync", ()).await }
        });
        peer.recv_request().await;
        peer.send_json(json!({"id": 1, "result": null})).await;
        sync.await.unwrap().unwrap();

        let params = rx.recv().await.unwrap();
        assert_eq!(FooEvent::deserialize(&params).unwrap(), FooEvent { n: 5 });
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_configured_timeout_applies_to_call() {
        let (stream, _peer) = connected().await;
        let client = Client::builder()
            .request_timeout(Duration::from_millis(20))
            .build(stream)
            .unwrap();

        let err = client.call::<_, Value>("Foo.slow", ()).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_call_with_timeout_overrides_default() {
        let (stream, _peer) = connected().await;
        let client = Client::new(stream);

        let err = client
            .call_with_timeout::<_, Value>("Foo.slow", (), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RequestTimeout { .. }));
    }

    #[tokio::test]
    async fn test_listener_can_spawn_calls() {
        let (stream, mut peer) = connected().await;
        let client = Client::new(stream);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let inner = client.clone();
        client.add_listener("Foo.ready", move |_: &Value| {
            let client = inner.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(client.call::<_, FooResult>("Foo.bar", ()).await);
            });
        });

        peer.send_json(json!({"method": "Foo.ready", "params": {}})).await;
        let request = peer.recv_request().await;
        peer.send_json(json!({"id": request["id"], "result": {"y": 9}})).await;

        assert_eq!(rx.recv().await.unwrap().unwrap(), FooResult { y: 9 });
    }
}
