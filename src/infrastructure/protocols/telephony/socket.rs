//! Telephony socket halves over an axum WebSocket

use crate::infrastructure::protocols::transport::{
    TelephonyFrame, TelephonyReceiver, TelephonySender, TransportError,
};
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tracing::debug;

fn map_axum_error(error: axum::Error) -> TransportError {
    let inner = error.into_inner();
    TransportError::from_error(inner.as_ref())
}

/// Split an upgraded provider socket into the two halves the bridge uses
pub fn split_socket(socket: WebSocket) -> (AxumTelephonySender, AxumTelephonyReceiver) {
    let (sink, stream) = socket.split();
    (
        AxumTelephonySender { sink, closed: false },
        AxumTelephonyReceiver { stream },
    )
}

pub struct AxumTelephonySender {
    sink: SplitSink<WebSocket, Message>,
    closed: bool,
}

#[async_trait]
impl TelephonySender for AxumTelephonySender {
    async fn send_audio(&mut self, pcm: Bytes) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::PeerClosed);
        }
        self.sink
            .send(Message::Binary(pcm.to_vec()))
            .await
            .map_err(map_axum_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.sink.close().await.map_err(map_axum_error) {
            Err(TransportError::PeerClosed) => Ok(()),
            other => other,
        }
    }
}

pub struct AxumTelephonyReceiver {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl TelephonyReceiver for AxumTelephonyReceiver {
    async fn recv(&mut self) -> Result<Option<TelephonyFrame>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(TelephonyFrame::Audio(Bytes::from(data))))
                }
                Some(Ok(Message::Text(text))) => return Ok(Some(TelephonyFrame::Text(text))),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Telephony provider closed the socket: {:?}", frame);
                    return Ok(None);
                }
                // Axum answers pings itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Err(e)) => {
                    return match map_axum_error(e) {
                        TransportError::PeerClosed => Ok(None),
                        other => Err(other),
                    }
                }
                None => return Ok(None),
            }
        }
    }
}
