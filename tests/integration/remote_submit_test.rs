use super::common;

use common::test_server::{RemoteStub, TestServer};
use serde_json::{json, Value};

fn values() -> Value {
    json!({
        "nombre": "María",
        "email": "maria@example.com",
        "edad": 34,
        "activo": true,
        "tags": "a, b,,c "
    })
}

#[tokio::test]
async fn test_submit_delivered_on_200() {
    let server = TestServer::new().await;
    let remote = RemoteStub::new().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/submit"))
        .json(&json!({"url": remote.url("/ok"), "values": values()}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["outcome"], "delivered");

    let received = remote.received();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        json!({
            "nombre": "María",
            "email": "maria@example.com",
            "edad": 34,
            "activo": true,
            "tags": ["a", "b", "c"]
        })
    );
}

#[tokio::test]
async fn test_submit_non_200_is_reported() {
    let server = TestServer::new().await;
    let remote = RemoteStub::new().await;
    let client = reqwest::Client::new();

    for (path, status) in [("/created", 201), ("/fail", 500)] {
        let response = client
            .post(server.url("/api/submit"))
            .json(&json!({"url": remote.url(path), "values": values()}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["outcome"], "rejected");
        assert_eq!(body["data"]["status"], status);
        assert_eq!(
            body["error"],
            format!("Error sending: status code {}", status)
        );
    }

    assert_eq!(remote.received().len(), 2);
}

#[tokio::test]
async fn test_submit_unreachable_endpoint_is_reported() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    // Bind then drop a listener so the port is known to be closed.
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let response = client
        .post(server.url("/api/submit"))
        .json(&json!({"url": format!("http://{}/ok", closed), "values": values()}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["outcome"], "failed");
}

#[tokio::test]
async fn test_invalid_form_is_not_sent() {
    let server = TestServer::new().await;
    let remote = RemoteStub::new().await;
    let client = reqwest::Client::new();

    let mut invalid = values();
    invalid["email"] = json!("nope");

    let response = client
        .post(server.url("/api/submit"))
        .json(&json!({"url": remote.url("/ok"), "values": invalid}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["errors"]["email"], "Invalid format for 'email'");
    assert!(remote.received().is_empty());
}

#[tokio::test]
async fn test_send_from_html_form() {
    let server = TestServer::new().await;
    let remote = RemoteStub::new().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/"))
        .form(&[
            ("field.nombre", "Ana"),
            ("field.email", "ana@example.com"),
            ("field.edad", "150"),
            ("field.activo", "on"),
            ("field.tags", "x, y"),
            ("_action", "send"),
            ("_url", remote.url("/ok").as_str()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Data sent successfully."));

    let received = remote.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["edad"], 100);
    assert_eq!(received[0]["tags"], json!(["x", "y"]));
}

#[tokio::test]
async fn test_save_from_html_form_writes_history_file() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/"))
        .form(&[
            ("field.nombre", "Ñandú"),
            ("field.edad", "7"),
            ("_action", "save"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Saved to history."));

    let content = std::fs::read_to_string(&server.history_path).unwrap();
    assert!(content.contains("\"nombre\": \"Ñandú\""));

    let log: Vec<Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(
        log,
        vec![json!({
            "nombre": "Ñandú",
            "email": "",
            "edad": 7,
            "activo": false,
            "tags": []
        })]
    );
}
