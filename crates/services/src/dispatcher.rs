use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;
use axum::http::Method;
use tracing::{debug, warn};

use crate::{cache, error::ServiceError, reply::ServiceReply, request::ServiceRequest};

/// Per-subsystem entry point invoked for `<subsystem>.<action>` calls.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        request: ServiceRequest,
        action: &str,
    ) -> Result<ServiceReply, ServiceError>;
}

/// Adapts an async closure taking `(request, action)` into a [`Dispatcher`].
pub struct FnDispatcher<F> {
    f: F,
}

pub fn from_fn<F, Fut>(f: F) -> FnDispatcher<F>
where
    F: Fn(ServiceRequest, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceReply, ServiceError>> + Send + 'static,
{
    FnDispatcher { f }
}

#[async_trait]
impl<F, Fut> Dispatcher for FnDispatcher<F>
where
    F: Fn(ServiceRequest, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceReply, ServiceError>> + Send + 'static,
{
    async fn dispatch(
        &self,
        request: ServiceRequest,
        action: &str,
    ) -> Result<ServiceReply, ServiceError> {
        (self.f)(request, action.to_string()).await
    }
}

type ActionFuture = Pin<Box<dyn Future<Output = Result<ServiceReply, ServiceError>> + Send>>;
type ActionFn = Arc<dyn Fn(ServiceRequest) -> ActionFuture + Send + Sync>;

struct Action {
    handler: ActionFn,
    methods: Option<Vec<Method>>,
    never_cache: bool,
}

/// Table of named actions; covers what most subsystems need.
#[derive(Default)]
pub struct SimpleDispatcher {
    actions: HashMap<String, Action>,
}

impl SimpleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ServiceReply, ServiceError>> + Send + 'static,
    {
        self.insert(name.into(), handler, false)
    }

    /// Like [`register`](Self::register), but response replies of this
    /// action carry never-cache headers.
    pub fn register_never_cache<F, Fut>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ServiceReply, ServiceError>> + Send + 'static,
    {
        self.insert(name.into(), handler, true)
    }

    /// Restricts an already registered action to the given methods.
    pub fn with_methods(mut self, name: &str, methods: &[Method]) -> Self {
        match self.actions.get_mut(name) {
            Some(action) => action.methods = Some(methods.to_vec()),
            None => warn!(action = name, "method restriction for unregistered action"),
        }
        self
    }

    pub fn actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert<F, Fut>(mut self, name: String, handler: F, never_cache: bool) -> Self
    where
        F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ServiceReply, ServiceError>> + Send + 'static,
    {
        let handler: ActionFn =
            Arc::new(move |request: ServiceRequest| -> ActionFuture { Box::pin(handler(request)) });
        if self
            .actions
            .insert(
                name.clone(),
                Action {
                    handler,
                    methods: None,
                    never_cache,
                },
            )
            .is_some()
        {
            warn!(action = %name, "replaced previously registered action");
        }
        self
    }
}

#[async_trait]
impl Dispatcher for SimpleDispatcher {
    async fn dispatch(
        &self,
        request: ServiceRequest,
        action: &str,
    ) -> Result<ServiceReply, ServiceError> {
        let Some(entry) = self.actions.get(action) else {
            debug!(action, "unknown service action");
            return Err(ServiceError::not_found("Service not found."));
        };

        if let Some(methods) = &entry.methods {
            request.require_method(methods)?;
        }

        let reply = (entry.handler)(request).await?;
        Ok(match reply {
            ServiceReply::Response(response) if entry.never_cache => {
                ServiceReply::Response(cache::never_cache(response))
            }
            other => other,
        })
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
