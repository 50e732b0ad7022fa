//! Integration tests for bearer-token authentication and CORS headers.

mod common;

use common::TestServer;
use plotd_server::ServerConfig;

fn token_config(token: &str) -> ServerConfig {
    ServerConfig::default().with_token(token)
}

#[tokio::test]
async fn missing_token_is_401_and_correct_token_is_200() {
    let server = TestServer::start_with(token_config("abc123"), 16).await;
    server.seed_pages(1);

    let client = reqwest::Client::new();
    let resp = client
        .get(server.url("/state"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(server.url("/state"))
        .bearer_auth("abc123")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(body["token"], true);
    assert_eq!(body["hsize"], 1);

    server.shutdown().await;
}

#[tokio::test]
async fn wrong_token_is_401() {
    let server = TestServer::start_with(token_config("abc123"), 16).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(server.url("/state"))
        .bearer_auth("abc124")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    server.shutdown().await;
}

#[tokio::test]
async fn unauthorized_does_not_reveal_route_existence() {
    let server = TestServer::start_with(token_config("abc123"), 16).await;

    let client = reqwest::Client::new();
    let real = client
        .get(server.url("/state"))
        .send()
        .await
        .expect("request");
    let fake = client
        .get(server.url("/no/such/route"))
        .send()
        .await
        .expect("request");
    assert_eq!(real.status(), 401);
    assert_eq!(fake.status(), 401);

    server.shutdown().await;
}

#[tokio::test]
async fn all_routes_require_the_token() {
    let server = TestServer::start_with(token_config("s3cret"), 16).await;
    server.seed_pages(1);

    let client = reqwest::Client::new();
    for request in [
        client.get(server.url("/plot/1.svg")),
        client.delete(server.url("/plot/1")),
        client.delete(server.url("/plot")),
        client.get(server.url("/")),
    ] {
        let resp = request.send().await.expect("request");
        assert_eq!(resp.status(), 401);
    }

    // History untouched by the rejected destructive requests.
    assert_eq!(server.store().snapshot().hsize, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn cors_headers_attached_when_enabled() {
    let config = ServerConfig {
        cors: true,
        ..ServerConfig::default()
    };
    let server = TestServer::start_with(config, 16).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(server.url("/state"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .contains_key("access-control-allow-origin"));

    server.shutdown().await;
}

#[tokio::test]
async fn cors_headers_absent_when_disabled() {
    let server = TestServer::start().await;

    let client = reqwest::Client::new();
    let resp = client
        .get(server.url("/state"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    assert!(!resp
        .headers()
        .contains_key("access-control-allow-origin"));

    server.shutdown().await;
}

#[tokio::test]
async fn unauthorized_response_still_carries_cors_headers() {
    let config = ServerConfig {
        cors: true,
        ..ServerConfig::default()
    }
    .with_token("abc123");
    let server = TestServer::start_with(config, 16).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(server.url("/state"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);
    assert!(resp
        .headers()
        .contains_key("access-control-allow-origin"));

    server.shutdown().await;
}
