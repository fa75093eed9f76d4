//! End-to-end tests against a real listener: REST flow with `reqwest` and
//! the live feed with `tokio-tungstenite`.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use participation_gateway::api::build_app;
use participation_gateway::app_state::AppState;

async fn spawn_server() -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = build_app(AppState::in_memory(1024), Duration::from_secs(5));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn send(request: reqwest::RequestBuilder) -> (u16, Value) {
    let Ok(response) = request.send().await else {
        panic!("request failed");
    };
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

fn id_of(value: &Value) -> String {
    let Some(id) = value.get("id").and_then(Value::as_str) else {
        panic!("missing id in {value}");
    };
    id.to_string()
}

async fn register(client: &reqwest::Client, base: &str, name: &str) -> String {
    let (status, body) = send(
        client
            .post(format!("{base}/admin/users"))
            .json(&json!({ "name": name, "email": format!("{name}@example.com") })),
    )
    .await;
    assert_eq!(status, 201);
    id_of(&body)
}

async fn published_event(client: &reqwest::Client, base: &str, owner: &str, limit: u32) -> String {
    let (status, body) = send(client.post(format!("{base}/users/{owner}/events")).json(&json!({
        "title": "Systems reading group",
        "annotation": "We read one classic systems paper per session",
        "description": "This week: the Chubby lock service, followed by open discussion",
        "eventDate": Utc::now() + chrono::Duration::days(7),
        "participantLimit": limit,
        "requestModeration": false,
    })))
    .await;
    assert_eq!(status, 201);
    let event_id = id_of(&body);

    let (status, _) = send(
        client
            .patch(format!("{base}/admin/events/{event_id}"))
            .json(&json!({ "stateAction": "PUBLISH_EVENT" })),
    )
    .await;
    assert_eq!(status, 200);
    event_id
}

#[tokio::test]
async fn concurrent_http_requests_respect_the_limit() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();
    let owner = register(&client, &base, "owner").await;
    let event_id = published_event(&client, &base, &owner, 3).await;

    let mut handles = Vec::new();
    for i in 0..12 {
        let client = client.clone();
        let base = base.clone();
        let event_id = event_id.clone();
        handles.push(tokio::spawn(async move {
            let guest = register(&client, &base, &format!("guest{i}")).await;
            send(client.post(format!("{base}/users/{guest}/requests?eventId={event_id}"))).await.0
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await {
            Ok(201) => created += 1,
            Ok(409) => conflicts += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!((created, conflicts), (3, 9));

    let (status, body) = send(client.get(format!("{base}/events/{event_id}"))).await;
    assert_eq!(status, 200);
    assert_eq!(body.get("confirmedRequests"), Some(&json!(3)));
}

#[tokio::test]
async fn cancel_is_idempotent_over_http() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();
    let owner = register(&client, &base, "owner").await;
    let guest = register(&client, &base, "guest").await;
    let event_id = published_event(&client, &base, &owner, 1).await;

    let (_, body) = send(client.post(format!("{base}/users/{guest}/requests?eventId={event_id}"))).await;
    let request_id = id_of(&body);

    for _ in 0..2 {
        let (status, body) = send(
            client.patch(format!("{base}/users/{guest}/requests/{request_id}/cancel")),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body.get("status"), Some(&json!("CANCELED")));
    }

    let (_, body) = send(client.get(format!("{base}/events/{event_id}"))).await;
    assert_eq!(body.get("confirmedRequests"), Some(&json!(0)));
}

#[tokio::test]
async fn websocket_feed_reports_new_requests() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();
    let owner = register(&client, &base, "owner").await;
    let guest = register(&client, &base, "guest").await;
    let event_id = published_event(&client, &base, &owner, 0).await;

    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": Utc::now(),
        "payload": { "command": "subscribe", "event_ids": [event_id] },
    });
    let Ok(()) = ws.send(Message::text(subscribe.to_string())).await else {
        panic!("ws send failed");
    };
    let ack = next_json(&mut ws).await;
    assert_eq!(ack.get("type"), Some(&json!("response")));
    assert_eq!(ack.get("id"), Some(&json!("sub-1")));

    let (status, _) = send(client.post(format!("{base}/users/{guest}/requests?eventId={event_id}"))).await;
    assert_eq!(status, 201);

    let event = next_json(&mut ws).await;
    assert_eq!(event.get("type"), Some(&json!("event")));
    assert_eq!(event.pointer("/payload/event_type"), Some(&json!("request_created")));
    assert_eq!(event.pointer("/payload/event_id"), Some(&json!(event_id)));
    assert_eq!(event.pointer("/payload/status"), Some(&json!("CONFIRMED")));
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await else {
            panic!("no ws message");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("ws frame is not JSON");
            };
            return value;
        }
    }
}
