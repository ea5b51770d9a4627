//! WebSocket connection and dispatch loop.
//!
//! This module multiplexes calls and notifications over one WebSocket,
//! including request/response correlation and notification routing.
//!
//! # Tasks
//!
//! The connection spawns two tokio tasks:
//!
//! - **Read loop**: the single reader. Decodes every inbound frame and
//!   either completes the matching pending call or runs the listeners
//!   registered for the notification's method.
//! - **Writer**: the single writer. Receives encoded frames from callers
//!   and writes them one at a time.
//!
//! Reading and writing proceed independently. Callers only ever wait on
//! their own completion channel.
//!
//! # Lifecycle
//!
//! `Open` → `Closed`, one way. The connection closes when the remote end
//! closes the socket, on any transport or framing error, on
//! [`Connection::shutdown`], or once every handle has been dropped. On
//! close every pending call fails with [`Error::ConnectionClosed`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::identifiers::{CallId, CallIdAllocator};
use crate::protocol::{Frame, Response, decode_frame, encode_request};

use super::listeners::{Listener, ListenerRegistry};
use super::pending::{PendingCalls, PendingGuard};

// ============================================================================
// Types
// ============================================================================

/// Internal commands for the writer task.
enum WriterCommand {
    /// Write one encoded request frame.
    Frame { call_id: CallId, text: String },
    /// Close the socket and stop.
    Shutdown,
}

/// State shared between handles and both tasks.
struct Shared {
    ids: CallIdAllocator,
    pending: PendingCalls,
    listeners: ListenerRegistry,
}

// ============================================================================
// Connection
// ============================================================================

/// Multiplexed RPC connection over a WebSocket.
///
/// Cheap to clone; all clones share one socket, one pending-call table and
/// one listener registry.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync`. [`send`](Self::send) may run on any
/// number of tasks at once; each call gets its own identifier and sees
/// only its own response.
#[derive(Clone)]
pub struct Connection {
    /// Channel to the writer task.
    writer_tx: mpsc::UnboundedSender<WriterCommand>,
    /// Tables shared with the tasks.
    shared: Arc<Shared>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Creates a connection over an established WebSocket stream.
    ///
    /// Spawns the read loop and the writer, so this must run inside a
    /// Tokio runtime. `max_pending` caps the number of concurrent calls.
    pub(crate) fn new<S>(stream: S, max_pending: Option<usize>) -> Self
    where
        S: Stream<Item = std::result::Result<Message, WsError>>
            + Sink<Message, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        let (sink, stream) = stream.split();
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let shared = Arc::new(Shared {
            ids: CallIdAllocator::new(),
            pending: PendingCalls::new(max_pending),
            listeners: ListenerRegistry::default(),
        });

        tokio::spawn(Self::run_writer(
            sink,
            writer_rx,
            Arc::clone(&shared),
            stop_tx,
        ));
        tokio::spawn(Self::run_read_loop(
            stream,
            Arc::clone(&shared),
            stop_rx,
            writer_tx.downgrade(),
        ));

        Self { writer_tx, shared }
    }

    /// Calls `method` and waits for its response.
    ///
    /// Waits for as long as it takes: there is no timeout, a call only
    /// ends early if the connection closes. Dropping the returned future
    /// abandons the call.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if `params` cannot be serialized
    /// - [`Error::Remote`] if the response carried an `error`
    /// - [`Error::ConnectionClosed`] if the connection is or becomes closed
    /// - [`Error::Protocol`] if the pending-call limit is reached
    pub async fn send<P>(&self, method: &str, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let (call_id, response_rx) = self.begin_call(method, params)?;
        let _guard = PendingGuard::new(&self.shared.pending, call_id);

        let response = response_rx.await.map_err(|_| Error::ConnectionClosed)??;
        response.into_result()
    }

    /// Calls `method` and waits at most `request_timeout` for its response.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`Error::RequestTimeout`] if no
    /// response arrived in time. The pending entry is removed on timeout.
    pub async fn send_with_timeout<P>(
        &self,
        method: &str,
        params: &P,
        request_timeout: Duration,
    ) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let (call_id, response_rx) = self.begin_call(method, params)?;
        let _guard = PendingGuard::new(&self.shared.pending, call_id);

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(response)) => response?.into_result(),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                debug!(%call_id, method, "Call timed out");
                Err(Error::request_timeout(call_id, timeout_millis(request_timeout)))
            }
        }
    }

    /// Registers a listener for notifications named `method`.
    ///
    /// Listeners for one method run in registration order. Registration
    /// never fails, and a listener added while a notification for `method`
    /// is being dispatched may or may not see that notification.
    pub fn add_listener(&self, method: impl Into<String>, listener: Listener) {
        self.shared.listeners.add(method, listener);
    }

    /// Returns the number of listeners registered for `method`.
    #[inline]
    #[must_use]
    pub fn listener_count(&self, method: &str) -> usize {
        self.shared.listeners.count(method)
    }

    /// Returns the number of pending calls.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Returns `true` once the read loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.pending.is_closed()
    }

    /// Closes the socket and fails all pending calls.
    ///
    /// Also happens implicitly once every handle has been dropped.
    pub fn shutdown(&self) {
        let _ = self.writer_tx.send(WriterCommand::Shutdown);
    }

    /// Allocates an id, registers the call and queues its frame.
    fn begin_call<P>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<(CallId, oneshot::Receiver<Result<Response>>)>
    where
        P: Serialize + ?Sized,
    {
        let call_id = self.shared.ids.next_id();
        let text = encode_request(call_id, method, params)?;

        let (response_tx, response_rx) = oneshot::channel();
        self.shared.pending.insert(call_id, response_tx)?;

        if self
            .writer_tx
            .send(WriterCommand::Frame { call_id, text })
            .is_err()
        {
            self.shared.pending.remove(call_id);
            return Err(Error::ConnectionClosed);
        }

        trace!(%call_id, method, "Call queued");
        Ok((call_id, response_rx))
    }

    /// Writer task: the only code that touches the sink.
    async fn run_writer<W>(
        mut sink: W,
        mut writer_rx: mpsc::UnboundedReceiver<WriterCommand>,
        shared: Arc<Shared>,
        stop_tx: oneshot::Sender<()>,
    ) where
        W: Sink<Message, Error = WsError> + Unpin,
    {
        loop {
            match writer_rx.recv().await {
                Some(WriterCommand::Frame { call_id, text }) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        error!(%call_id, error = %e, "Failed to write frame");
                        shared.pending.fail(call_id, Error::WebSocket(e));
                        break;
                    }
                    trace!(%call_id, "Frame written");
                }

                Some(WriterCommand::Shutdown) => {
                    debug!("Shutdown requested");
                    let _ = sink.close().await;
                    break;
                }

                None => {
                    debug!("All connection handles dropped");
                    let _ = sink.close().await;
                    break;
                }
            }
        }

        // Stop the read loop; it owns failing whatever is still pending.
        let _ = stop_tx.send(());
        debug!("Writer terminated");
    }

    /// Read loop: the only code that touches the stream.
    async fn run_read_loop<R>(
        mut stream: R,
        shared: Arc<Shared>,
        mut stop_rx: oneshot::Receiver<()>,
        writer_tx: mpsc::WeakUnboundedSender<WriterCommand>,
    ) where
        R: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
    {
        loop {
            tokio::select! {
                message = stream.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = Self::handle_incoming(text.as_bytes(), &shared) {
                                error!(
                                    error = %e,
                                    len = text.len(),
                                    head = %log_prefix(text.as_str()),
                                    "Undecodable frame"
                                );
                                break;
                            }
                        }

                        Some(Ok(Message::Binary(bytes))) => {
                            if let Err(e) = Self::handle_incoming(&bytes, &shared) {
                                error!(error = %e, len = bytes.len(), "Undecodable binary frame");
                                break;
                            }
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw frames
                        Some(Ok(_)) => {}
                    }
                }

                _ = &mut stop_rx => {
                    debug!("Read loop stopped by writer");
                    break;
                }
            }
        }

        shared.pending.close();

        if let Some(writer_tx) = writer_tx.upgrade() {
            let _ = writer_tx.send(WriterCommand::Shutdown);
        }

        debug!("Read loop terminated");
    }

    /// Routes one inbound frame.
    ///
    /// Only a decode failure is an error; unknown ids and notifications
    /// nobody listens to are dropped.
    fn handle_incoming(bytes: &[u8], shared: &Shared) -> Result<()> {
        match decode_frame(bytes)? {
            Frame::Notification(notification) => {
                let ran = shared.listeners.dispatch(&notification);
                trace!(method = %notification.method, listeners = ran, "Notification dispatched");
            }

            Frame::Response(response) => {
                let call_id = response.id;
                if shared.pending.complete(response) {
                    trace!(%call_id, "Response routed");
                } else {
                    debug!(%call_id, "Response for unknown call, dropped");
                }
            }
        }
        Ok(())
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn timeout_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Longest frame prefix written to the log.
const LOG_PREFIX_CHARS: usize = 128;

/// Returns at most [`LOG_PREFIX_CHARS`] characters of `text`.
fn log_prefix(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREFIX_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================
