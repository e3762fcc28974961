use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// The model artifact could not be turned into a runnable plan. Fatal at startup.
#[derive(Debug, Error)]
#[error("failed to load model from {}: {reason}", path.display())]
pub struct ModelLoadError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    Output(String),

    #[error("model output violates the classifier contract: {0}")]
    Contract(String),

    #[error("prediction was cancelled: {0}")]
    Blocking(String),
}

impl ResponseError for InvocationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: expected a positive integer")]
    InvalidNumber { name: &'static str, value: String },
}
