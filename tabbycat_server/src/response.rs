use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use sea_orm::DbErr;
use serde::{Serialize, Deserialize};
use tracing::error;


#[derive(Debug, Clone)]
pub struct APIError {
    pub message: String,
    pub code: StatusCode
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct APIErrorResponse {
    pub message: String
}

impl APIError {
    pub fn new(message: String) -> Self {
        APIError {
            message,
            code: StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn new_with_status(code: StatusCode, message: &str) -> Self {
        APIError {
            message: message.to_string(),
            code
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new_with_status(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        APIError { message: message.into(), code: StatusCode::BAD_REQUEST }
    }
}

impl From<anyhow::Error> for APIError {
    fn from(err: anyhow::Error) -> Self {
        error!("Error while handling request {}", err.to_string());
        APIError { message: err.to_string(), code: StatusCode::INTERNAL_SERVER_ERROR }
    }
}

impl From<DbErr> for APIError {
    fn from(err: DbErr) -> Self {
        handle_error(err)
    }
}

impl IntoResponse for APIError
{
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&APIErrorResponse {message: self.message.clone()})
            .unwrap_or_else(|_| "{}".into());
        let mut res = (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body
        ).into_response();
        *res.status_mut() = self.code;
        res
    }
}


impl From<(StatusCode, &str)> for APIError {
    fn from((code, message): (StatusCode, &str)) -> Self {
        if code.is_server_error() {
            error!("Error while handling request {}", message);
        }
        APIError { message: message.to_string(), code }
    }
}

impl From<(StatusCode, String)> for APIError {
    fn from((code, message): (StatusCode, String)) -> Self {
        if code.is_server_error() {
            error!("Error while handling request {}", message);
        }
        APIError { message, code }
    }
}

pub fn handle_error<E>(err: E) -> APIError
where
    E: std::error::Error
{
    error!("Error while handling request {}", err);
    APIError::new(err.to_string())
}
