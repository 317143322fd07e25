//! WebSocket connection to the realtime speech provider

use crate::config::RealtimeConfig;
use crate::infrastructure::bridge::error::BridgeError;
use crate::infrastructure::protocols::transport::{TransportError, UpstreamReceiver, UpstreamSender};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Both halves of a freshly opened upstream socket
pub struct UpstreamConnection {
    pub sender: Box<dyn UpstreamSender>,
    pub receiver: Box<dyn UpstreamReceiver>,
}

/// Opens upstream sockets; one call per bridged call
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    async fn connect(&self) -> Result<UpstreamConnection, BridgeError>;
}

/// Connector for the provider's realtime WebSocket endpoint
pub struct RealtimeConnector {
    url: String,
    api_key: Option<String>,
}

impl RealtimeConnector {
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl UpstreamConnector for RealtimeConnector {
    async fn connect(&self) -> Result<UpstreamConnection, BridgeError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| BridgeError::UpstreamConnect(format!("bad endpoint {}: {}", self.url, e)))?;

        let headers = request.headers_mut();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| BridgeError::UpstreamConnect(format!("invalid API key: {}", e)))?;
            headers.insert("Authorization", value);
        }
        headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        let (stream, response) = connect_async(request)
            .await
            .map_err(|e| BridgeError::UpstreamConnect(e.to_string()))?;
        info!("Connected to realtime provider (HTTP {})", response.status());

        let (sink, source) = stream.split();
        Ok(UpstreamConnection {
            sender: Box::new(TungsteniteSender { sink, closed: false }),
            receiver: Box::new(TungsteniteReceiver { source }),
        })
    }
}

fn map_ws_error(error: WsError) -> TransportError {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::PeerClosed,
        WsError::Io(ref io) => TransportError::from_io(io),
        other => TransportError::Io(other.to_string()),
    }
}

struct TungsteniteSender {
    sink: SplitSink<WsStream, Message>,
    closed: bool,
}

#[async_trait]
impl UpstreamSender for TungsteniteSender {
    async fn send_text(&mut self, document: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::PeerClosed);
        }
        self.sink.send(Message::Text(document)).await.map_err(map_ws_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.sink.close().await.map_err(map_ws_error) {
            Err(TransportError::PeerClosed) => Ok(()),
            other => other,
        }
    }
}

struct TungsteniteReceiver {
    source: SplitStream<WsStream>,
}

#[async_trait]
impl UpstreamReceiver for TungsteniteReceiver {
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.source.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Realtime provider closed the socket: {:?}", frame);
                    return Ok(None);
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!("Ignoring binary frame from realtime provider ({} bytes)", data.len());
                }
                // Ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return match map_ws_error(e) {
                        TransportError::PeerClosed => Ok(None),
                        other => Err(other),
                    }
                }
                None => return Ok(None),
            }
        }
    }
}
