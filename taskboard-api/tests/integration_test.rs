/// Integration tests for the Taskboard API
///
/// These tests require a running PostgreSQL database (DATABASE_URL) and a
/// JWT_SECRET of at least 32 characters. They exercise the system
/// end-to-end: authentication, board/column/task lifecycle, the capacity
/// limit at the HTTP boundary, and the membership guards.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

async fn send(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_board_routes_require_authentication() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/boards")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_board_column_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    // Create a board.
    let (status, board) = send(
        &ctx,
        "POST",
        "/v1/boards",
        &token,
        Some(json!({"name": "Release planning"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", board);
    let board_id = board["id"].as_i64().unwrap();

    // Two columns, appended in order.
    let (status, todo) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/columns", board_id),
        &token,
        Some(json!({"name": "Todo"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", todo);
    let (status, doing) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/columns", board_id),
        &token,
        Some(json!({"name": "Doing", "wip_limit": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", doing);
    let todo_id = todo["id"].as_i64().unwrap();
    let doing_id = doing["id"].as_i64().unwrap();

    // Create two tasks in Todo.
    let (status, first) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/columns/{}/tasks", board_id, todo_id),
        &token,
        Some(json!({"title": "Write changelog"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    let (status, second) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/columns/{}/tasks", board_id, todo_id),
        &token,
        Some(json!({"title": "Tag release"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", second);
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    // Move the first task into Doing (capacity 1).
    let (status, moved) = send(
        &ctx,
        "PATCH",
        &format!("/v1/boards/{}/tasks/{}/move", board_id, first_id),
        &token,
        Some(json!({"to_column_id": doing_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", moved);
    assert_eq!(moved["column_id"].as_i64().unwrap(), doing_id);

    // The second move hits the WIP limit.
    let (status, body) = send(
        &ctx,
        "PATCH",
        &format!("/v1/boards/{}/tasks/{}/move", board_id, second_id),
        &token,
        Some(json!({"to_column_id": doing_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["error"], "capacity_exceeded");

    // The rejected task is still in Todo.
    let (status, task) = send(
        &ctx,
        "GET",
        &format!("/v1/boards/{}/tasks/{}", board_id, second_id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["column_id"].as_i64().unwrap(), todo_id);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_membership_guards_over_http() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();
    let (other, other_token) = ctx.other_user().await.unwrap();

    let (status, board) = send(
        &ctx,
        "POST",
        "/v1/boards",
        &token,
        Some(json!({"name": "Guarded"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let board_id = board["id"].as_i64().unwrap();

    // A second admin is rejected with 409.
    let (status, body) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/members", board_id),
        &token,
        Some(json!({"email": other.email, "role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["error"], "second_admin_not_allowed");

    // Adding a viewer works; the viewer can read but not write.
    let (status, _) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/members", board_id),
        &token,
        Some(json!({"email": other.email, "role": "viewer"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &ctx,
        "GET",
        &format!("/v1/boards/{}", board_id),
        &other_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &ctx,
        "POST",
        &format!("/v1/boards/{}/columns", board_id),
        &other_token,
        Some(json!({"name": "Not allowed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Self-removal is forbidden.
    let (status, body) = send(
        &ctx,
        "DELETE",
        &format!("/v1/boards/{}/members", board_id),
        &token,
        Some(json!({"email": ctx.user.email})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_and_login() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("flow-{}@example.com", uuid::Uuid::new_v4());

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": email,
                "password": "Sup3rSecret",
                "name": "Flow Tester"
            })
            .to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"email": email, "password": "Sup3rSecret"}).to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());

    // Wrong password is rejected.
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"email": email, "password": "WrongPass1"}).to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}
