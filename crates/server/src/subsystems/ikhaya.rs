use std::{collections::HashMap, sync::Arc};

use axum::http::{Method, StatusCode};
use services::{ServiceError, ServiceReply, ServiceRequest, SimpleDispatcher};
use tokio::sync::RwLock;
use tracing::info;

/// In-memory article suggestions and the editors they can be assigned to.
#[derive(Debug, Default)]
pub struct SuggestionBoard {
    owners: RwLock<HashMap<i64, Option<String>>>,
    editors: Vec<String>,
}

impl SuggestionBoard {
    pub fn new(suggestions: impl IntoIterator<Item = i64>, editors: Vec<String>) -> Self {
        Self {
            owners: RwLock::new(suggestions.into_iter().map(|id| (id, None)).collect()),
            editors,
        }
    }

    pub fn seeded(editors: Vec<String>) -> Self {
        Self::new(1..=3, editors)
    }

    pub async fn owner(&self, suggestion: i64) -> Option<Option<String>> {
        self.owners.read().await.get(&suggestion).cloned()
    }

    /// `-` clears the owner; other names must match an editor, ignoring case.
    pub async fn assign(&self, suggestion: i64, username: &str) -> Result<(), ServiceError> {
        let owner = if username == "-" {
            None
        } else {
            let editor = self
                .editors
                .iter()
                .find(|name| name.eq_ignore_ascii_case(username))
                .ok_or_else(|| ServiceError::not_found("No such user."))?;
            Some(editor.clone())
        };

        let mut owners = self.owners.write().await;
        let slot = owners
            .get_mut(&suggestion)
            .ok_or_else(|| ServiceError::not_found("No such suggestion."))?;
        info!(suggestion, owner = ?owner, "suggestion assignment changed");
        *slot = owner;
        Ok(())
    }
}

pub fn dispatcher(board: SuggestionBoard) -> SimpleDispatcher {
    let board = Arc::new(board);
    SimpleDispatcher::new()
        .register_never_cache("change_suggestion_assignment", move |req: ServiceRequest| {
            let board = board.clone();
            async move {
                let (Some(username), Some(suggestion)) = (req.form("username"), req.form("suggestion"))
                else {
                    return Ok(ServiceReply::response(StatusCode::BAD_REQUEST));
                };
                let suggestion = suggestion
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ServiceError::not_found("No such suggestion."))?;
                board.assign(suggestion, &username).await?;
                Ok(ServiceReply::Value(serde_json::Value::Bool(true)))
            }
        })
        .with_methods("change_suggestion_assignment", &[Method::POST])
}
