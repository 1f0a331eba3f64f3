use crate::error::Result;
use crate::protocol::live::{ClientMessage, LiveSetup, ServerMessage};
use crate::{Error, safe_truncate};
use futures::{SinkExt, StreamExt};
use serde_json::from_slice;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

const TRACE_LOG_MAX_BYTES: usize = 1024;

#[derive(Debug)]
pub struct WsStream(WebSocketStream<MaybeTlsStream<TcpStream>>);

impl WsStream {
    pub(crate) const fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self(stream)
    }
}

impl futures::Stream for WsStream {
    type Item = std::result::Result<
        tokio_tungstenite::tungstenite::Message,
        tokio_tungstenite::tungstenite::Error,
    >;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        std::pin::Pin::new(&mut self.0).poll_next(cx)
    }
}

impl futures::Sink<tokio_tungstenite::tungstenite::Message> for WsStream {
    type Error = tokio_tungstenite::tungstenite::Error;

    fn poll_ready(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::pin::Pin::new(&mut self.0).poll_ready(cx)
    }

    fn start_send(
        mut self: std::pin::Pin<&mut Self>,
        item: tokio_tungstenite::tungstenite::Message,
    ) -> std::result::Result<(), Self::Error> {
        std::pin::Pin::new(&mut self.0).start_send(item)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::pin::Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_close(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::pin::Pin::new(&mut self.0).poll_close(cx)
    }
}

/// Establish a WebSocket connection to the Live API.
///
/// # Errors
/// Returns an error if the URL is invalid or the handshake fails.
pub async fn connect(base_url: &str, api_key: &str) -> Result<WsStream> {
    let mut url = Url::parse(base_url)?;
    url.query_pairs_mut().append_pair("key", api_key);

    let req = tokio_tungstenite::tungstenite::client::IntoClientRequest::into_client_request(
        url.as_str(),
    )?;
    let (ws_stream, _) = connect_async(req).await?;

    tracing::info!("Connected to Gemini Live");

    Ok(WsStream::new(ws_stream))
}

/// A live-audio socket that has completed the setup handshake.
pub struct LiveClient {
    stream: WsStream,
}

impl LiveClient {
    /// Connect and send the session setup, waiting for `setupComplete`.
    ///
    /// # Errors
    /// Returns an error if the connection fails, the server rejects the
    /// setup, or the socket closes before setup completes.
    pub async fn connect(base_url: &str, api_key: &str, setup: LiveSetup) -> Result<Self> {
        let stream = connect(base_url, api_key).await?;
        let mut client = Self { stream };
        client.send(&ClientMessage::Setup(setup)).await?;

        loop {
            match client.next_message().await? {
                Some(msg) if msg.is_setup_complete() => {
                    tracing::debug!("Live setup complete");
                    return Ok(client);
                }
                Some(ServerMessage { error: Some(err), .. }) => return Err(Error::Api(err)),
                Some(_) => {}
                None => return Err(Error::ConnectionClosed),
            }
        }
    }

    /// Send a client message.
    ///
    /// # Errors
    /// Returns an error if serialization or the WebSocket send fails.
    pub async fn send(&mut self, message: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        tracing::trace!("Sending live message: {}", safe_truncate(&json, TRACE_LOG_MAX_BYTES));
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Receive the next server message. `None` means the server closed the socket.
    ///
    /// # Errors
    /// Returns an error if deserialization fails or the WebSocket fails.
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>> {
        while let Some(msg) = self.stream.next().await {
            let payload = match msg? {
                Message::Text(text) => text.as_bytes().to_vec(),
                Message::Binary(bytes) => bytes.to_vec(),
                Message::Close(frame) => {
                    tracing::info!("Live socket closed by server: {:?}", frame);
                    return Ok(None);
                }
                Message::Ping(payload) => {
                    tracing::debug!("Received Ping, sending Pong");
                    self.stream.send(Message::Pong(payload)).await?;
                    continue;
                }
                _ => continue,
            };
            if let Ok(text) = std::str::from_utf8(&payload) {
                tracing::trace!(
                    "Received live message: {}",
                    safe_truncate(text, TRACE_LOG_MAX_BYTES)
                );
            }
            return Ok(Some(from_slice::<ServerMessage>(&payload)?));
        }
        Ok(None)
    }

    /// Close the socket, ignoring a peer that already went away.
    ///
    /// # Errors
    /// Returns an error if the close frame cannot be sent.
    pub async fn close(&mut self) -> Result<()> {
        match self.stream.close().await {
            Ok(())
            | Err(
                tokio_tungstenite::tungstenite::Error::ConnectionClosed
                | tokio_tungstenite::tungstenite::Error::AlreadyClosed,
            ) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

