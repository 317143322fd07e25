//! End-to-end call over a real WebSocket with a scripted realtime provider

mod common;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use common::{test_app, ScriptedConnector, ScriptedUpstream, CALLER};
use futures::{SinkExt, StreamExt};
use orderline::interface::api::build_router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

async fn next_document(upstream: &mut ScriptedUpstream) -> Value {
    let text = timeout(WAIT, upstream.sent.recv())
        .await
        .expect("timed out waiting for upstream document")
        .expect("upstream closed");
    serde_json::from_str(&text).unwrap()
}

async fn serve(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_call_relays_audio_and_creates_order() {
    let (connector, mut upstream) = ScriptedConnector::new();
    let app = test_app(Arc::new(connector));
    let orders = app.orders.clone();
    let mut dashboard = app.broadcaster.subscribe();
    let addr = serve(build_router(app.state, None, app.broadcaster)).await;

    let url = format!(
        "ws://{}/voice/stream?to_number=%2B33100000000&caller_number=%2B33611111111",
        addr
    );
    let (mut phone, _) = connect_async(url).await.unwrap();

    let session = next_document(&mut upstream).await;
    assert_eq!(session["type"], "session.update");
    assert_eq!(session["session"]["voice"], "sage");
    assert!(session["session"]["instructions"]
        .as_str()
        .unwrap()
        .contains("Burger 9.50"));

    // caller audio goes up verbatim
    phone.send(Message::Binary(vec![1, 2, 3, 4])).await.unwrap();
    let append = next_document(&mut upstream).await;
    assert_eq!(append["type"], "input_audio_buffer.append");
    assert_eq!(BASE64.decode(append["audio"].as_str().unwrap()).unwrap(), vec![1, 2, 3, 4]);

    // model audio comes down verbatim
    upstream
        .events
        .send(json!({"type": "response.audio.delta", "delta": BASE64.encode([9u8, 8, 7])}).to_string())
        .unwrap();
    let frame = loop {
        match timeout(WAIT, phone.next()).await.unwrap().unwrap().unwrap() {
            Message::Binary(data) => break data,
            _ => continue,
        }
    };
    assert_eq!(frame, vec![9, 8, 7]);

    // barge-in
    upstream
        .events
        .send(json!({"type": "input_audio_buffer.speech_started"}).to_string())
        .unwrap();
    assert_eq!(next_document(&mut upstream).await["type"], "response.cancel");

    // order tool call
    upstream
        .events
        .send(
            json!({
                "type": "response.function_call_arguments.done",
                "call_id": "call_1",
                "name": "create_order_tool",
                "arguments": "{\"order_details\":\"2 burgers\",\"customer_name\":\"Alice\"}",
            })
            .to_string(),
        )
        .unwrap();

    let output = next_document(&mut upstream).await;
    assert_eq!(output["type"], "conversation.item.create");
    let result: Value = serde_json::from_str(output["item"]["output"].as_str().unwrap()).unwrap();
    assert_eq!(result["status"], "success");
    assert_eq!(result["order_id"], 1);
    assert_eq!(next_document(&mut upstream).await["type"], "response.create");

    let event = timeout(WAIT, dashboard.recv()).await.unwrap().unwrap();
    assert_eq!(event.event_type, "new_order");
    assert_eq!(event.data["order_id"], 1);

    let stored = orders.orders().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].order_detail, "2 burgers");
    assert_eq!(stored[0].customer_name, "Alice");
    assert_eq!(stored[0].address, "Pickup");
    assert_eq!(stored[0].customer_phone, CALLER);

    // hang up; the bridge drops its upstream writer
    phone.close(None).await.unwrap();
    let closed = timeout(WAIT, async {
        while upstream.sent.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn test_disabled_tenant_is_hung_up() {
    let (connector, mut upstream) = ScriptedConnector::new();
    let app = test_app(Arc::new(connector));
    let addr = serve(build_router(app.state, None, app.broadcaster)).await;

    let (mut phone, _) = connect_async(format!("ws://{}/voice/stream?to_number=%2B33199999999", addr))
        .await
        .unwrap();

    let ended = timeout(WAIT, async {
        loop {
            match phone.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok());
    // never connected, so nothing was sent and the connection is still parked
    assert!(upstream.sent.try_recv().is_err());
}
