use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use service::users::HandlerResponse;
use thiserror::Error;

/// Adapter from the transport-neutral handler response to an axum response.
#[derive(Debug)]
pub struct ApiResponse(pub HandlerResponse);

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let HandlerResponse { status_code, body } = self.0;
        let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

impl From<HandlerResponse> for ApiResponse {
    fn from(resp: HandlerResponse) -> Self { Self(resp) }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_status_and_sets_json_content_type() {
        let resp = ApiResponse(HandlerResponse::error(404, "user not found")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn out_of_range_status_degrades_to_500() {
        let resp = ApiResponse(HandlerResponse { status_code: 42, body: String::new() }).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
