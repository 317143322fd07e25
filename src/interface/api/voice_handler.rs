//! Telephony provider endpoints: call answer, call events, and the audio stream

use crate::config::{ServerConfig, TelephonyConfig};
use crate::domain::shared::PhoneNumber;
use crate::infrastructure::bridge::{serve_call, BridgeServices};
use crate::infrastructure::protocols::telephony::split_socket;
use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Application state shared by the voice handlers
#[derive(Clone)]
pub struct AppState {
    pub bridge: BridgeServices,
    pub server: ServerConfig,
    pub telephony: TelephonyConfig,
}

/// Numbers the provider passes on the stream connection
#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    pub to_number: Option<String>,
    pub caller_number: Option<String>,
}

/// Numbers the provider passes when a call comes in
#[derive(Debug, Default, Deserialize)]
pub struct AnswerParams {
    pub to: Option<String>,
    pub from: Option<String>,
}

/// One entry of the call control answer
#[derive(Debug, Clone, Serialize)]
pub struct ConnectAction {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub endpoint: Vec<WebSocketEndpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebSocketEndpoint {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub uri: String,
    #[serde(rename = "content-type")]
    pub content_type: String,
    pub headers: Value,
}

/// Answer webhook: point the provider at our audio stream
///
/// Numbers come from the JSON body on POST and the query string on GET.
pub async fn answer_call(
    State(state): State<AppState>,
    Query(query): Query<AnswerParams>,
    body: Option<Json<AnswerParams>>,
) -> Json<Vec<ConnectAction>> {
    let body = body.map(|Json(params)| params).unwrap_or_default();
    let to = body.to.or(query.to);
    let from = body.from.or(query.from);
    info!("Answering call from {:?} to {:?}", from, to);

    Json(vec![ConnectAction {
        action: "connect",
        from: to.clone(),
        endpoint: vec![WebSocketEndpoint {
            kind: "websocket",
            uri: format!("wss://{}/voice/stream", state.server.public_url),
            content_type: state.telephony.content_type.clone(),
            headers: json!({
                "to_number": to,
                "caller_number": from,
            }),
        }],
    }])
}

/// Event webhook: call status updates from the provider
pub async fn call_event(body: Option<Json<Value>>) -> Json<Value> {
    match body {
        Some(Json(event)) => info!("Call event: {}", event),
        None => warn!("Call event without a JSON body"),
    }
    Json(json!({"status": "ok"}))
}

/// Audio stream: bridge the upgraded socket to the realtime provider
pub async fn voice_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StreamParams>,
) -> Response {
    let dialed = header_or_query(&headers, "to_number", query.to_number.as_deref());
    let caller = header_or_query(&headers, "caller_number", query.caller_number.as_deref());
    debug!("Stream requested for {:?} from {:?}", dialed, caller);

    let services = state.bridge.clone();
    ws.on_upgrade(move |socket| async move {
        let (mut tx, mut rx) = split_socket(socket);
        let outcome = serve_call(services, dialed, caller, &mut rx, &mut tx).await;
        info!("Stream ended: {:?}", outcome);
    })
    .into_response()
}

fn header_or_query(headers: &HeaderMap, name: &str, query: Option<&str>) -> Option<PhoneNumber> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(PhoneNumber::parse)
        .or_else(|| query.and_then(PhoneNumber::parse))
}
