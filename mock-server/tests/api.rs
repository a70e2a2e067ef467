use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Capture};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "api.test")
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::CONTENT_LENGTH, body.len().to_string())
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- capture ---

#[tokio::test]
async fn capture_get_returns_201_with_command() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/users/7")
                .header(http::header::HOST, "api.test")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let capture: Capture = body_json(resp).await;
    assert_eq!(capture.method, "GET");
    assert_eq!(capture.path, "/users/7");
    assert_eq!(capture.command, "curl -X 'GET' 'http://api.test/users/7' --compressed");
}

#[tokio::test]
async fn capture_post_includes_body_and_headers() {
    let resp = app()
        .oneshot(json_request("POST", "/orders?dry_run=1", r#"{"sku":"a'b"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let capture: Capture = body_json(resp).await;
    assert_eq!(
        capture.command,
        r#"curl -X 'POST' -d '{"sku":"a'\''b"}' -H 'content-type: application/json' 'http://api.test/orders' --compressed"#
    );
    assert_eq!(capture.tokens.to_string(), capture.command);
}

#[tokio::test]
async fn capture_without_host_header_has_empty_host() {
    let resp = app().oneshot(empty_request("DELETE", "/x")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let capture: Capture = body_json(resp).await;
    assert_eq!(capture.command, "curl -X 'DELETE' 'http:///x' --compressed");
}

// --- list / get / delete ---

#[tokio::test]
async fn list_captures_empty() {
    let resp = app().oneshot(empty_request("GET", "/captures")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let captures: Vec<Capture> = body_json(resp).await;
    assert!(captures.is_empty());
}

#[tokio::test]
async fn capture_then_get_list_and_delete() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(json_request("PUT", "/items/1", r#"{"n":1}"#))
        .await
        .unwrap();
    let created: Capture = body_json(resp).await;

    let resp = app
        .clone()
        .oneshot(empty_request("GET", &format!("/captures/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Capture = body_json(resp).await;
    assert_eq!(fetched.command, created.command);

    let resp = app.clone().oneshot(empty_request("GET", "/captures")).await.unwrap();
    let captures: Vec<Capture> = body_json(resp).await;
    assert_eq!(captures.len(), 1);

    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/captures/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app
        .oneshot(empty_request("GET", &format!("/captures/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unrouted_method_on_captures_is_405_and_not_captured() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/captures", r#"{"n":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = app
        .clone()
        .oneshot(empty_request("PUT", "/captures/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = app.oneshot(empty_request("GET", "/captures")).await.unwrap();
    let captures: Vec<Capture> = body_json(resp).await;
    assert!(captures.is_empty());
}

#[tokio::test]
async fn get_unknown_capture_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/captures/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_capture_returns_404() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/captures/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_capture_invalid_uuid_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/captures/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
