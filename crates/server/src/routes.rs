use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use service::errors::ServiceError;
use service::users::{HandlerRequest, HandlerResponse, UserHandlers};

use crate::errors::ApiResponse;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the normalized request. Bodies must be UTF-8 text.
fn to_request(path: Option<HashMap<String, String>>, body: Bytes) -> Result<HandlerRequest, HandlerResponse> {
    let body = if body.is_empty() {
        None
    } else {
        let text = String::from_utf8(body.to_vec())
            .map_err(|_| HandlerResponse::from(ServiceError::BadRequest("Invalid JSON body".into())))?;
        Some(text)
    };
    Ok(HandlerRequest { path_parameters: path, body })
}

async fn create_user(State(users): State<UserHandlers>, body: Bytes) -> ApiResponse {
    match to_request(None, body) {
        Ok(req) => users.create(req).await.into(),
        Err(resp) => resp.into(),
    }
}

type IdPath = Result<Path<HashMap<String, String>>, PathRejection>;

/// Path parameters, or the JSON 400 a malformed segment (e.g. invalid UTF-8) earns.
fn path_params(path: IdPath) -> Result<HashMap<String, String>, HandlerResponse> {
    path.map(|Path(params)| params).map_err(|rejection| {
        HandlerResponse::from(ServiceError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text())))
    })
}

async fn fetch_user(State(users): State<UserHandlers>, path: IdPath) -> ApiResponse {
    match path_params(path) {
        Ok(params) => users.fetch(HandlerRequest { path_parameters: Some(params), body: None }).await.into(),
        Err(resp) => resp.into(),
    }
}

async fn update_user(State(users): State<UserHandlers>, path: IdPath, body: Bytes) -> ApiResponse {
    let req = path_params(path).and_then(|params| to_request(Some(params), body));
    match req {
        Ok(req) => users.update(req).await.into(),
        Err(resp) => resp.into(),
    }
}

/// `/users` and `/users/` carry no id; the handlers answer 400.
async fn fetch_user_without_id(State(users): State<UserHandlers>) -> ApiResponse {
    users.fetch(HandlerRequest::new()).await.into()
}

async fn update_user_without_id(State(users): State<UserHandlers>, body: Bytes) -> ApiResponse {
    match to_request(None, body) {
        Ok(req) => users.update(req).await.into(),
        Err(resp) => resp.into(),
    }
}

/// Build the full application router
pub fn build_router(users: UserHandlers, cors: CorsLayer) -> Router {
    let public = Router::new().route("/health", get(health));

    let user_routes = Router::new()
        .route(
            "/users",
            post(create_user).get(fetch_user_without_id).put(update_user_without_id),
        )
        .route("/users/", get(fetch_user_without_id).put(update_user_without_id))
        .route("/users/:id", get(fetch_user).put(update_user))
        .with_state(users);

    public
        .merge(user_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use service::ids::UuidGenerator;
    use service::storage::{BlobStore, MemoryBlobStore};
    use tower::ServiceExt;

    fn app(store: Arc<MemoryBlobStore>) -> Router {
        build_router(UserHandlers::new(store, Arc::new(UuidGenerator)), CorsLayer::very_permissive())
    }

    async fn call(app: &Router, method: Method, uri: &str, body: impl Into<Body>) -> anyhow::Result<(StatusCode, Vec<u8>)> {
        let req = Request::builder().method(method).uri(uri).body(body.into())?;
        let resp = app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    #[tokio::test]
    async fn health_is_ok() -> anyhow::Result<()> {
        let (status, body) = call(&app(MemoryBlobStore::new()), Method::GET, "/health", Body::empty()).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Value>(&body)?, json!({"status": "ok"}));
        Ok(())
    }

    #[tokio::test]
    async fn create_then_fetch_and_update() -> anyhow::Result<()> {
        let store = MemoryBlobStore::new();
        let app = app(store.clone());

        let (status, body) = call(&app, Method::POST, "/users", r#"{"name":"Ada"}"#).await?;
        assert_eq!(status, StatusCode::CREATED);
        let created: Value = serde_json::from_slice(&body)?;
        let id = created["id"].as_str().unwrap_or_default().to_string();
        assert_eq!(id.len(), 36);

        let (status, body) = call(&app, Method::GET, &format!("/users/{id}"), Body::empty()).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, store.get(&format!("{id}.json")).await?);

        let (status, body) = call(&app, Method::PUT, &format!("/users/{id}"), r#"{"name":"Grace"}"#).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Value>(&body)?, json!({"id": id, "name": "Grace"}));
        Ok(())
    }

    #[tokio::test]
    async fn routes_without_id_are_bad_requests() -> anyhow::Result<()> {
        let app = app(MemoryBlobStore::new());
        for uri in ["/users", "/users/"] {
            for method in [Method::GET, Method::PUT] {
                let (status, body) = call(&app, method.clone(), uri, Body::empty()).await?;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
                assert_eq!(body, br#"{"error":"Missing UUID"}"#, "{method} {uri}");
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() -> anyhow::Result<()> {
        let store = MemoryBlobStore::new();
        let app = app(store.clone());
        let (status, body) = call(&app, Method::GET, "/users/nope", Body::empty()).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, br#"{"error":"user not found"}"#);

        let (status, _) = call(&app, Method::PUT, "/users/nope", "{}").await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_id_segment_is_json_bad_request() -> anyhow::Result<()> {
        let store = MemoryBlobStore::new();
        let app = app(store.clone());
        for method in [Method::GET, Method::PUT] {
            let (status, body) = call(&app, method.clone(), "/users/%FF", "{}").await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
            let err: Value = serde_json::from_slice(&body)?;
            let msg = err["error"].as_str().unwrap_or_default();
            assert!(msg.starts_with("Invalid path parameter"), "{msg}");
        }
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn non_utf8_body_is_bad_request() -> anyhow::Result<()> {
        let store = MemoryBlobStore::new();
        let (status, body) = call(&app(store.clone()), Method::POST, "/users", vec![0xff, 0xfe]).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, br#"{"error":"Invalid JSON body"}"#);
        assert!(store.is_empty().await);
        Ok(())
    }
}
