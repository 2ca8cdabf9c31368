//! User handlers

use super::X_CACHE;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use stash_core::{InsertResponse, NewUser, User};
use tokio_util::sync::CancellationToken;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(user): Json<NewUser>,
) -> Result<Json<InsertResponse>, ApiError> {
    let id = state.users.create(&user).await?;
    Ok(Json(InsertResponse::new(id, &user.name)))
}

/// Record store lookup, bypassing the cache
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    match state.users.get_uncached(id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound(format!("User {}", id))),
    }
}

/// Cache-aside lookup
pub async fn get_cached(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    // Cancelled if axum drops this future (client went away)
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.users.get(id, &cancel).await? {
        Some(resolved) => {
            Ok(([(X_CACHE, resolved.origin.as_str())], Json(resolved.entity)).into_response())
        }
        None => Err(ApiError::NotFound(format!("User {}", id))),
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{body_json, send, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_resolve() {
        let t = TestApp::with_first_id(7);

        let (status, _, body) = send(
            &t.app,
            "POST",
            "/user",
            Some(json!({ "name": "Alice", "age": 30, "location": "NYC" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(&body);
        assert_eq!(body["id"], 7);
        assert_eq!(body["message"], "User Alice has been inserted");

        let (status, headers, body) = send(&t.app, "GET", "/user-redis/7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-cache"], "miss");
        assert_eq!(
            body_json(&body),
            json!({ "userid": 7, "name": "Alice", "age": 30, "location": "NYC" })
        );
        assert_eq!(t.store.lookups(), 1);
        assert_eq!(t.cache.sets(), 1);

        let (status, headers, _) = send(&t.app, "GET", "/user-redis/7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-cache"], "hit");
        assert_eq!(t.store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_404_and_not_cached() {
        let t = TestApp::new();

        let (status, _, body) = send(&t.app, "GET", "/user-redis/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body_json(&body)["code"], "not_found");
        assert!(t.cache.is_empty());

        let (status, _, _) = send(&t.app, "GET", "/user/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cache_outage_is_invisible() {
        let t = TestApp::new();
        send(
            &t.app,
            "POST",
            "/user",
            Some(json!({ "name": "Bob", "age": 0, "location": "" })),
        )
        .await;
        t.cache.set_unreachable(true);

        let (status, headers, body) = send(&t.app, "GET", "/user-redis/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-cache"], "miss");
        assert_eq!(body_json(&body)["name"], "Bob");
    }

    #[tokio::test]
    async fn test_store_outage_is_500() {
        let t = TestApp::new();
        t.store.set_unreachable(true);

        let (status, _, body) = send(&t.app, "GET", "/user-redis/1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&body)["code"], "store_error");

        let (status, _, _) = send(&t.app, "GET", "/user", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_list_and_direct_get() {
        let t = TestApp::new();
        for name in ["Alice", "Bob"] {
            send(
                &t.app,
                "POST",
                "/user",
                Some(json!({ "name": name, "age": 20, "location": "NYC" })),
            )
            .await;
        }

        let (status, _, body) = send(&t.app, "GET", "/user", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body).as_array().unwrap().len(), 2);

        let (status, _, body) = send(&t.app, "GET", "/user/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body)["name"], "Bob");
        assert_eq!(t.cache.gets(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let t = TestApp::new();
        let (status, _, _) = send(&t.app, "GET", "/user-redis/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(t.store.lookups(), 0);
    }
}
