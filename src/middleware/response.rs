use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);
        match to_value(&self.data) {
            Ok(data) => (status, Json(json!({ "success": true, "data": data }))).into_response(),
            Err(response) => response,
        }
    }
}

/// Collection envelope: `{ success, count, message, data }`.
#[derive(Debug)]
pub struct ApiList<T: Serialize> {
    pub items: Vec<T>,
    pub message: &'static str,
}

impl<T: Serialize> ApiList<T> {
    pub fn new(items: Vec<T>, message: &'static str) -> Self {
        Self { items, message }
    }
}

impl<T: Serialize> IntoResponse for ApiList<T> {
    fn into_response(self) -> Response {
        let count = self.items.len();
        match to_value(&self.items) {
            Ok(data) => Json(json!({
                "success": true,
                "count": count,
                "message": self.message,
                "data": data
            }))
            .into_response(),
            Err(response) => response,
        }
    }
}

fn to_value<T: Serialize>(data: &T) -> Result<Value, Response> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("Failed to serialize response data: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "Failed to serialize response data",
                "code": "INTERNAL_SERVER_ERROR"
            })),
        )
            .into_response()
    })
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type ApiListResult<T> = Result<ApiList<T>, crate::error::ApiError>;
