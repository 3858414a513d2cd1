// SPDX-License-Identifier: MIT

//! Login/logout flow tests that work offline (admin identities come from
//! configuration, not the database).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_admin_login_sets_session_cookie() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/login",
            serde_json::json!({ "id": "admin1", "password": "admin_password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("coursetrack_session="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_admin_login_wrong_password() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/login",
            serde_json::json!({ "id": "admin1", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_rejects_missing_fields() {
    let (app, _) = common::create_test_app();

    // Blank password fails validation before any storage access.
    let response = app
        .oneshot(json_post(
            "/signup",
            serde_json::json!({
                "name": "Asha",
                "enrollment_id": "EN-001",
                "college_name": "State College",
                "batch": "2026",
                "password": "  "
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_enrollment_id_signup_rejected() {
    require_emulator!();

    let state = common::test_state(common::test_db().await);
    let app = coursetrack::routes::create_router(state.clone());

    let enrollment_id = format!("EN-{}", uuid::Uuid::new_v4());
    let payload = serde_json::json!({
        "name": "Asha",
        "enrollment_id": enrollment_id,
        "college_name": "State College",
        "batch": "2026",
        "password": "hunter2"
    });

    let response = app
        .clone()
        .oneshot(json_post("/signup", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same enrollment ID again: rejected as a validation error.
    let response = app.oneshot(json_post("/signup", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["error"], "validation_error");

    let user = state
        .db
        .find_user_by_enrollment_id(&enrollment_id)
        .await
        .expect("lookup")
        .expect("first signup stored");
    state.db.delete_user(&user.id).await.expect("cleanup");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("removal cookie set")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("coursetrack_session="));
    // Removal cookie expires in the past
    assert!(set_cookie.contains("Max-Age=0") || set_cookie.contains("Expires="));
}
