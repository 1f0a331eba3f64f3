use crate::Result;
use crate::protocol::live::{ClientMessage, LiveSetup, ServerMessage};
use crate::transport::BoxFuture;
use crate::transport::ws::LiveClient;

/// An open live session on the wire.
pub trait LiveTransport: Send {
    fn send(&mut self, message: ClientMessage) -> BoxFuture<'_, Result<()>>;
    /// `Ok(None)` means the server closed the session.
    fn next_message(&mut self) -> BoxFuture<'_, Result<Option<ServerMessage>>>;
    fn close(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// Opens live sessions; the returned transport has completed setup.
pub trait LiveConnector: Send + Sync {
    fn connect(&self, setup: LiveSetup) -> BoxFuture<'_, Result<Box<dyn LiveTransport>>>;
}

impl LiveTransport for LiveClient {
    fn send(&mut self, message: ClientMessage) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { Self::send(self, &message).await })
    }

    fn next_message(&mut self) -> BoxFuture<'_, Result<Option<ServerMessage>>> {
        Box::pin(Self::next_message(self))
    }

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(Self::close(self))
    }
}

/// Connector for the Gemini Live WebSocket endpoint.
#[derive(Clone)]
pub struct WsConnector {
    url: String,
    api_key: String,
}

impl WsConnector {
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for WsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnector").field("url", &self.url).finish_non_exhaustive()
    }
}

impl LiveConnector for WsConnector {
    fn connect(&self, setup: LiveSetup) -> BoxFuture<'_, Result<Box<dyn LiveTransport>>> {
        Box::pin(async move {
            let client = LiveClient::connect(&self.url, &self.api_key, setup).await?;
            Ok(Box::new(client) as Box<dyn LiveTransport>)
        })
    }
}
