// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::to_bytes,
    http::StatusCode,
    response::IntoResponse,
};
use skillswap_api::error::AppError;
use skillswap_api::models::TransitionError;

async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::Conflict("x".into()), StatusCode::CONFLICT),
        (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
        assert_eq!(err.into_response().status(), expected);
    }
}

#[tokio::test]
async fn test_client_errors_carry_details() {
    let (status, json) = body_json(AppError::NotFound("Swap s1 not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["details"], "Swap s1 not found");
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let (status, json) = body_json(AppError::Internal(anyhow::anyhow!("secret path"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
    assert!(json.get("details").is_none());
}

#[test]
fn test_invalid_transition_is_conflict() {
    let err: AppError = TransitionError::Invalid {
        entity: "swap request",
        from: "Accepted",
        to: "Accepted",
    }
    .into();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_wrong_actor_is_forbidden() {
    let err: AppError = TransitionError::NotAllowed {
        entity: "swap request",
        action: "accept",
        role: "recipient",
    }
    .into();
    assert!(matches!(err, AppError::Forbidden(_)));
}
