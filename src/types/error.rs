use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors surfaced by the object store and the listing pipeline
#[derive(Debug)]
pub enum StoreError {
    NoSuchKey,
    AccessDenied,
    ListFailed(String),
    ReadFailed(String),
}

impl StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NoSuchKey => StatusCode::NOT_FOUND,
            StoreError::AccessDenied => StatusCode::FORBIDDEN,
            StoreError::ListFailed(_) => StatusCode::BAD_GATEWAY,
            StoreError::ReadFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            StoreError::NoSuchKey => "The requested path does not exist.",
            StoreError::AccessDenied => "Access Denied",
            StoreError::ListFailed(_) => "Upstream store error while listing the directory.",
            StoreError::ReadFailed(_) => "Upstream store error while reading the object.",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NoSuchKey => write!(f, "no such key"),
            StoreError::AccessDenied => write!(f, "access denied"),
            StoreError::ListFailed(msg) => write!(f, "list failed: {}", msg),
            StoreError::ReadFailed(msg) => write!(f, "read failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4();

        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>{status}</title></head>\n\
             <body><h1>{status}</h1><p>{message}</p>\n\
             <p><small>Request ID: {request_id}</small></p></body></html>\n",
            status = status,
            message = self.message(),
            request_id = request_id,
        );

        (status, [("content-type", "text/html")], body).into_response()
    }
}
