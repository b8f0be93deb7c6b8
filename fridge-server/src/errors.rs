use axum::{
    http,
    response::{IntoResponse, Response},
};
pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Internal Server Error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let display = self.to_string();
        match self {
            WebError::Internal(e) => {
                tracing::error!("{:#}", e);
                (http::StatusCode::INTERNAL_SERVER_ERROR, display).into_response()
            }
            WebError::BadRequest(_) => (http::StatusCode::BAD_REQUEST, display).into_response(),
            WebError::NotFound => (http::StatusCode::NOT_FOUND, "Not Found").into_response(),
        }
    }
}
