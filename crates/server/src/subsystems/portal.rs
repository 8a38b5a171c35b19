use std::sync::Arc;

use services::{ServiceReply, ServiceRequest, SimpleDispatcher};

pub const MIN_AUTOCOMPLETE_CHARS: usize = 3;
pub const MAX_AUTOCOMPLETE_ITEMS: usize = 10;

pub fn dispatcher(users: Vec<String>) -> SimpleDispatcher {
    let users = Arc::new(users);
    SimpleDispatcher::new().register("get_user_autocompletion", move |req: ServiceRequest| {
        let users = users.clone();
        async move {
            let q = req.query("q").unwrap_or_default();
            ServiceReply::json(&autocomplete(&users, q))
        }
    })
}

/// Case-insensitive prefix matches, shortest names first.
///
/// `None` when the query is too short to be worth completing.
pub fn autocomplete(users: &[String], q: &str) -> Option<Vec<String>> {
    if q.chars().count() < MIN_AUTOCOMPLETE_CHARS {
        return None;
    }
    let prefix = q.to_lowercase();
    let mut matches: Vec<&String> = users
        .iter()
        .filter(|name| name.to_lowercase().starts_with(&prefix))
        .collect();
    matches.sort_by_key(|name| name.chars().count());
    Some(
        matches
            .into_iter()
            .take(MAX_AUTOCOMPLETE_ITEMS)
            .cloned()
            .collect(),
    )
}
