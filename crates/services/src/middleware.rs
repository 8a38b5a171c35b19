use std::{error::Error as StdError, sync::Arc};

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use shared::domain::{ServiceTarget, SERVICE_PARAM};
use tracing::{debug, trace, warn};

use crate::{
    cache, error::ServiceError, registry::ServiceRegistry, reply::ServiceReply,
    request::{decode_pairs, ServiceRequest},
};

pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct ServiceState {
    registry: Arc<ServiceRegistry>,
    max_body_bytes: usize,
}

impl ServiceState {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Answers `/?__service__=<subsystem>.<action>` with the registered
/// dispatcher and lets every other request through untouched.
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn service_middleware(
    State(state): State<ServiceState>,
    req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let Some(raw) = service_param(req.uri()) else {
        return Ok(next.run(req).await);
    };

    let target = match ServiceTarget::parse(&raw) {
        Some(target) if !target.is_reserved() => target,
        _ => {
            trace!(service = %raw, "not a routable service target");
            return Ok(next.run(req).await);
        }
    };

    let Some(entry) = state.registry.get(&target.subsystem) else {
        debug!(subsystem = %target.subsystem, "no dispatcher for service call");
        return Ok(StatusCode::BAD_REQUEST.into_response());
    };

    let (parts, body) = req.into_parts();
    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(error) => {
            let error = error.into_inner();
            if is_length_limit(&*error) {
                warn!(
                    service = %target,
                    limit = state.max_body_bytes,
                    "service request body over limit"
                );
                return Err(ServiceError::PayloadTooLarge {
                    limit: state.max_body_bytes,
                });
            }
            warn!(%error, service = %target, "failed to read service request body");
            return Err(ServiceError::bad_request("failed to read request body"));
        }
    };

    debug!(
        subsystem = entry.name(),
        action = %target.action,
        method = %parts.method,
        "dispatching service call"
    );
    let reply = entry
        .dispatcher()
        .dispatch(ServiceRequest::from_parts(&parts, body), &target.action)
        .await?;

    Ok(finish(reply, entry.never_cache()))
}

fn is_length_limit(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}

/// The raw `__service__` value, for requests on the root path only.
pub fn service_param(uri: &Uri) -> Option<String> {
    if uri.path() != "/" {
        return None;
    }
    decode_pairs(uri.query()?.as_bytes())
        .into_iter()
        .rev()
        .find(|(key, _)| key == SERVICE_PARAM)
        .map(|(_, value)| value)
}

/// Turns a dispatcher reply into the outgoing response.
///
/// Never-cache headers are only applied to replies that already are
/// responses; synthesized JSON responses are left cacheable.
pub fn finish(reply: ServiceReply, never_cache: bool) -> Response {
    match reply {
        ServiceReply::Response(response) if never_cache => cache::never_cache(response),
        ServiceReply::Response(response) => response,
        ServiceReply::Value(value) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            )],
            value.to_string(),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[path = "tests/middleware_tests.rs"]
mod tests;
