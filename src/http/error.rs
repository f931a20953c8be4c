use rouille::Response;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedUri(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<rouille::input::json::JsonError> for ApiError {
    fn from(err: rouille::input::json::JsonError) -> Self {
        ApiError::BadRequest(format!("invalid request body: {err}"))
    }
}

impl ApiError {
    pub fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => Response::text(msg).with_status_code(400),

            ApiError::Internal(msg) => Response::text(msg).with_status_code(500),
        }
    }
}
