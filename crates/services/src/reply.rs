use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;

/// What a dispatcher hands back to the middleware.
pub enum ServiceReply {
    /// Emitted as-is.
    Response(Response),
    /// Serialized as an `application/json` body.
    Value(Value),
}

impl ServiceReply {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ServiceError> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }

    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    pub fn response(response: impl IntoResponse) -> Self {
        Self::Response(response.into_response())
    }
}
