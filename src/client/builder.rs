//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use devtools_rpc::Client;
//!
//! # async fn example() -> devtools_rpc::Result<()> {
//! let client = Client::builder()
//!     .max_pending_calls(128)
//!     .connect("ws://127.0.0.1:9222/devtools/page/ABC")
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::{Sink, Stream};
use tokio_tungstenite::connect_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::info;
use url::Url;

use crate::error::{Error, Result};

use super::core::Client;
use super::options::ClientOptions;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Options handed to the client.
    options: ClientOptions,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Caps the number of calls awaiting a response at once.
    #[inline]
    #[must_use]
    pub fn max_pending_calls(mut self, max: usize) -> Self {
        self.options.max_pending_calls = Some(max);
        self
    }

    /// Caps the size of inbound messages when dialing.
    #[inline]
    #[must_use]
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.options.max_message_size = Some(bytes);
        self
    }

    /// Sets the default timeout for [`Client::call`] and friends.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = Some(timeout);
        self
    }

    /// Dials `url` and returns a client over the new connection.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL or an option is invalid
    /// - [`Error::Connection`] if the WebSocket handshake fails
    pub async fn connect(self, url: &str) -> Result<Client> {
        self.validate_options()?;
        let url = Self::validate_url(url)?;

        let config = self
            .options
            .max_message_size
            .map(|size| WebSocketConfig::default().max_message_size(Some(size)));

        let (ws_stream, _) = connect_async_with_config(url.as_str(), config, false)
            .await
            .map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

        info!(%url, "WebSocket connection established");

        Ok(Client::from_parts(ws_stream, self.options))
    }

    /// Builds a client over an already established WebSocket stream.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an option is invalid.
    pub fn build<S>(self, stream: S) -> Result<Client>
    where
        S: Stream<Item = std::result::Result<Message, WsError>>
            + Sink<Message, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        self.validate_options()?;
        Ok(Client::from_parts(stream, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Rejects options that would make every call fail.
    fn validate_options(&self) -> Result<()> {
        if self.options.max_pending_calls == Some(0) {
            return Err(Error::config("max_pending_calls must be at least 1"));
        }

        if self.options.request_timeout == Some(Duration::ZERO) {
            return Err(Error::config("request_timeout must be non-zero"));
        }

        Ok(())
    }

    /// Parses a WebSocket URL, accepting plain `ws://` only.
    fn validate_url(url: &str) -> Result<Url> {
        let url = Url::parse(url).map_err(|e| Error::config(format!("Invalid URL '{url}': {e}")))?;

        match url.scheme() {
            "ws" => {}
            "wss" => return Err(Error::config("TLS (wss://) is not supported")),
            other => {
                return Err(Error::config(format!(
                    "Unsupported URL scheme '{other}', expected ws://"
                )));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::config(format!("URL '{url}' has no host")));
        }

        Ok(url)
    }
}

// ============================================================================
// Tests
// ============================================================================
