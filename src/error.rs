// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::AuthError;
use crate::database::{keys, StoreError};

/// Which login input caused a failed login. Each has a stable code so
/// clients can point at the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    CompanyNotFound,
    UserNotFound,
    InvalidPassword,
    AccountSuspended,
}

impl LoginFailure {
    pub fn status_code(&self) -> u16 {
        match self {
            LoginFailure::CompanyNotFound => 404,
            LoginFailure::UserNotFound => 404,
            LoginFailure::InvalidPassword => 401,
            LoginFailure::AccountSuspended => 403,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LoginFailure::CompanyNotFound => "COMPANY_NOT_FOUND",
            LoginFailure::UserNotFound => "USER_NOT_FOUND",
            LoginFailure::InvalidPassword => "INVALID_PASSWORD",
            LoginFailure::AccountSuspended => "ACCOUNT_SUSPENDED",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            LoginFailure::CompanyNotFound => "slug",
            LoginFailure::UserNotFound => "email",
            LoginFailure::InvalidPassword => "password",
            LoginFailure::AccountSuspended => "general",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoginFailure::CompanyNotFound => "Company not found",
            LoginFailure::UserNotFound => "User not found",
            LoginFailure::InvalidPassword => "Invalid password",
            LoginFailure::AccountSuspended => "Account is suspended",
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation {
        message: String,
        fields: Option<BTreeMap<String, String>>,
    },
    InvalidJson(String),
    Duplicate(String),
    InvalidInvite,

    // 401 / 403 / 404 depending on the failing field
    Login(LoginFailure),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),
    TenantMismatch,
    QuotaExceeded(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Duplicate(_) => 400,
            ApiError::InvalidInvite => 400,
            ApiError::Login(failure) => failure.status_code(),
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::TenantMismatch => 403,
            ApiError::QuotaExceeded(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Duplicate(msg) => msg,
            ApiError::InvalidInvite => "Invalid or expired invite token",
            ApiError::Login(failure) => failure.message(),
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::TenantMismatch => "Tenant mismatch",
            ApiError::QuotaExceeded(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::Internal(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Duplicate(_) => "DUPLICATE",
            ApiError::InvalidInvite => "INVALID_INVITE",
            ApiError::Login(failure) => failure.error_code(),
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::TenantMismatch => "TENANT_MISMATCH",
            ApiError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        match self {
            ApiError::Validation { fields: Some(fields), .. } => {
                body["fields"] = json!(fields);
            }
            ApiError::Login(failure) => {
                body["errorField"] = json!(failure.field());
                body["message"] = json!(failure.message());
            }
            _ => {}
        }

        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, fields: Option<BTreeMap<String, String>>) -> Self {
        ApiError::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.into());
        ApiError::validation("Validation failed", Some(fields))
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        ApiError::QuotaExceeded(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

fn duplicate_message(key: &str) -> &'static str {
    match key {
        keys::PRODUCT_SKU => "A product with this SKU already exists",
        keys::CATEGORY_NAME => "A category with this name already exists",
        keys::USER_EMAIL => "A user with this email already exists",
        keys::TENANT_SLUG => "A tenant with this slug already exists",
        keys::SUPER_ADMIN_EMAIL => "A super admin with this email already exists",
        _ => "Duplicate value",
    }
}

fn not_found_message(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
        None => "Not found".to_string(),
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { fields } => ApiError::validation("Validation failed", Some(fields)),
            StoreError::Conflict { key } => match key {
                keys::CATEGORY_IN_USE => {
                    ApiError::conflict("Category is still referenced by products")
                }
                keys::INVITE_ACCEPTED => ApiError::conflict("Invite has already been accepted"),
                keys::TENANT_INVITE => {
                    tracing::error!("Invite token digest collision");
                    ApiError::internal("An error occurred while processing your request")
                }
                other => ApiError::Duplicate(duplicate_message(other).to_string()),
            },
            StoreError::NotFound { entity } => ApiError::NotFound(not_found_message(entity)),
            StoreError::Internal(msg) => {
                // Don't expose driver errors to clients
                tracing::error!("Store error: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::unauthorized("Token has expired"),
            AuthError::TokenInvalid(reason) => {
                tracing::debug!("Rejected token: {}", reason);
                ApiError::unauthorized("Invalid token")
            }
            AuthError::Crypto(msg) => {
                tracing::error!("Credential error: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
