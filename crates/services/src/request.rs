use axum::{
    body::Bytes,
    http::{header, request::Parts, HeaderMap, Method, Uri},
};

use crate::error::ServiceError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully buffered service call as seen by a dispatcher.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    method: Method,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Bytes,
}

impl ServiceRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = decode_pairs(uri.query().unwrap_or_default().as_bytes());
        Self {
            method,
            headers,
            query,
            body,
        }
    }

    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            body,
        )
    }

    /// Last value of a query parameter, matching multi-dict lookups.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Decoded url-encoded form body. Empty for any other content type.
    fn form_pairs(&self) -> Vec<(String, String)> {
        if !self.has_form_body() {
            return Vec::new();
        }
        decode_pairs(&self.body)
    }

    /// Last value of a form field.
    pub fn form(&self, name: &str) -> Option<String> {
        self.form_pairs()
            .into_iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn require_method(&self, allowed: &[Method]) -> Result<(), ServiceError> {
        if allowed.contains(&self.method) {
            return Ok(());
        }
        Err(ServiceError::MethodNotAllowed {
            method: self.method.clone(),
            allowed: allowed.to_vec(),
        })
    }

    fn has_form_body(&self) -> bool {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim_start().starts_with(FORM_CONTENT_TYPE))
            .unwrap_or(false)
    }
}

pub(crate) fn decode_pairs(raw: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw).into_owned().collect()
}
