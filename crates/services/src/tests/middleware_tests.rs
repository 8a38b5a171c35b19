use super::*;
use axum::{
    body::{self, Body, Bytes},
    http::{self, HeaderMap, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use serde_json::json;
use tower::ServiceExt;

use crate::dispatcher::{from_fn, SimpleDispatcher};

fn wiki() -> SimpleDispatcher {
    SimpleDispatcher::new()
        .register("ok", |_| async { Ok(ServiceReply::Value(json!({ "ok": true }))) })
        .register("echo", |req: ServiceRequest| async move {
            ServiceReply::json(&req.form("text"))
        })
        .register("preview", |_| async {
            Ok(ServiceReply::response((
                StatusCode::CREATED,
                [(header::CONTENT_TYPE, "text/plain"), (header::ETAG, "\"v1\"")],
                "<p>preview</p>",
            )))
        })
        .register("fail", |_| async {
            Err(ServiceError::from(anyhow::anyhow!("backend unavailable")))
        })
}

fn registry() -> ServiceRegistry {
    ServiceRegistry::builder()
        .register("wiki", wiki())
        .and_then(|b| b.register_never_cache("forum", wiki()))
        .and_then(|b| {
            b.register(
                "echo",
                from_fn(|_, action| async move { ServiceReply::json(&action) }),
            )
        })
        .and_then(|b| b.register("utils", from_fn(|_, _| async { Ok(ServiceReply::null()) })))
        .and_then(|b| {
            b.register(
                "middlewares",
                from_fn(|_, _| async { Ok(ServiceReply::null()) }),
            )
        })
        .expect("registry")
        .build()
}

fn app_with(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(|| async { "index" }).post(|| async { "index" }))
        .route("/about", get(|| async { "about" }))
        .layer(from_fn_with_state(state, service_middleware))
}

fn app() -> Router {
    app_with(ServiceState::new(Arc::new(registry())))
}

async fn send(app: Router, request: http::Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, headers, body)
}

async fn get_uri(app: Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = http::Request::get(uri).body(Body::empty()).expect("request");
    send(app, request).await
}

#[tokio::test]
async fn requests_without_service_param_pass_through() {
    let (status, _, body) = get_uri(app(), "/?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"index");

    let (status, _, body) = get_uri(app(), "/about?__service__=wiki.ok").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"about");
}

#[tokio::test]
async fn malformed_targets_fall_through() {
    for uri in [
        "/?__service__=",
        "/?__service__=wiki",
        "/?__service__=wiki.",
        "/?__service__=.ok",
    ] {
        let (status, _, body) = get_uri(app(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body.as_ref(), b"index", "{uri}");
    }
}

#[tokio::test]
async fn reserved_subsystems_fall_through_even_when_registered() {
    for uri in ["/?__service__=utils.foo", "/?__service__=middlewares.foo"] {
        let (status, _, body) = get_uri(app(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body.as_ref(), b"index", "{uri}");
    }
}

#[tokio::test]
async fn unknown_subsystem_is_bad_request_with_empty_body() {
    let (status, _, body) = get_uri(app(), "/?__service__=unknownmodule.action").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn plain_values_become_json_responses() {
    let (status, headers, body) = get_uri(app(), "/?__service__=wiki.ok").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(value, json!({ "ok": true }));
}

#[tokio::test]
async fn action_keeps_everything_after_the_first_dot() {
    let (status, _, body) = get_uri(app(), "/?__service__=echo.a.b.c").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"\"a.b.c\"");
}

#[tokio::test]
async fn response_replies_pass_through_unchanged() {
    let (status, headers, body) = get_uri(app(), "/?__service__=wiki.preview").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(headers[header::ETAG], "\"v1\"");
    assert!(headers.get(header::CACHE_CONTROL).is_none());
    assert_eq!(body.as_ref(), b"<p>preview</p>");
}

#[tokio::test]
async fn never_cache_applies_to_response_replies_only() {
    let (status, headers, body) = get_uri(app(), "/?__service__=forum.preview").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_ref(), b"<p>preview</p>");
    let cache_control = headers[header::CACHE_CONTROL].to_str().expect("ascii");
    assert!(cache_control.contains("no-store"));
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert!(headers.contains_key(header::EXPIRES));

    let (status, headers, _) = get_uri(app(), "/?__service__=forum.ok").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(header::CACHE_CONTROL).is_none());
    assert!(headers.get(header::PRAGMA).is_none());
}

#[tokio::test]
async fn dispatcher_errors_reach_the_error_pipeline() {
    let (status, headers, body) = get_uri(app(), "/?__service__=wiki.fail").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(value["code"], "internal");

    let (status, _, _) = get_uri(app(), "/?__service__=wiki.missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn form_bodies_reach_the_dispatcher() {
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/?__service__=wiki.echo")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("text=hello+world"))
        .expect("request");
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"\"hello world\"");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = app_with(ServiceState::new(Arc::new(registry())).with_body_limit(4));
    let request = http::Request::post("/?__service__=wiki.echo")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("text=much too long"))
        .expect("request");
    let (status, headers, body) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(value["code"], "payload_too_large");
}

#[tokio::test]
async fn broken_body_streams_are_bad_requests() {
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![Err(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ))];
    let request = http::Request::post("/?__service__=wiki.echo")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .expect("request");
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(value["code"], "bad_request");
}

#[tokio::test]
async fn repeated_calls_yield_identical_responses() {
    let first = get_uri(app(), "/?__service__=wiki.ok").await;
    let second = get_uri(app(), "/?__service__=wiki.ok").await;
    assert_eq!(first.0, second.0);
    assert_eq!(first.2, second.2);
}

#[test]
fn service_param_only_on_root_path() {
    let uri: Uri = "/?a=1&__service__=wiki.ok".parse().expect("uri");
    assert_eq!(service_param(&uri).as_deref(), Some("wiki.ok"));

    let uri: Uri = "/wiki/?__service__=wiki.ok".parse().expect("uri");
    assert!(service_param(&uri).is_none());

    let uri: Uri = "/".parse().expect("uri");
    assert!(service_param(&uri).is_none());
}
