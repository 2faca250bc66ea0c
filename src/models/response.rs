use crate::validation::Violation;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Violation>,
}

impl ErrorResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "failed".to_string(),
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn success(data: T) -> Self {
        DataResponse {
            status: "success".to_string(),
            results: None,
            data,
        }
    }
}

impl<T: Serialize> DataResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        DataResponse {
            status: "success".to_string(),
            results: Some(data.len()),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        MessageResponse {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}
