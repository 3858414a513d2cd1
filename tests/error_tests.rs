// SPDX-License-Identifier: MIT

use axum::http::StatusCode;
use axum::response::IntoResponse;
use coursetrack::error::AppError;

#[test]
fn test_error_status_codes() {
    let cases = [
        (AppError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden, StatusCode::FORBIDDEN),
        (
            AppError::NotFound("video".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (
            AppError::Upstream("ffmpeg died".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Timeout("video upload".to_string()),
            StatusCode::GATEWAY_TIMEOUT,
        ),
        (
            AppError::Database("unreachable".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected) in cases {
        let response = error.into_response();
        assert_eq!(response.status(), expected);
    }
}

#[test]
fn test_upstream_detail_not_leaked() {
    // Upstream failures surface a generic body; the transcoder/storage
    // detail stays server-side.
    let response = AppError::Upstream("s3 bucket credentials rejected".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
