use std::{collections::HashMap, fs};

use serde::Deserialize;
use services::DEFAULT_MAX_BODY_BYTES;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub max_service_body_bytes: usize,
    pub autocomplete_users: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            max_service_body_bytes: DEFAULT_MAX_BODY_BYTES,
            autocomplete_users: ["admin", "anonymous", "annette", "andreas", "ubuntu_user"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string("server.toml").ok();
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml` values, then environment variables.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.server_bind = v.clone();
                }
                if let Some(v) = file_cfg.get("max_service_body_bytes") {
                    apply_body_limit(&mut settings, v);
                }
                if let Some(v) = file_cfg.get("autocomplete_users") {
                    settings.autocomplete_users = parse_user_list(v);
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__MAX_SERVICE_BODY_BYTES") {
        apply_body_limit(&mut settings, &v);
    }

    if let Some(v) = env("APP__AUTOCOMPLETE_USERS") {
        settings.autocomplete_users = parse_user_list(&v);
    }

    settings
}

fn apply_body_limit(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<usize>() {
        Ok(parsed) => settings.max_service_body_bytes = parsed,
        Err(error) => warn!(%error, value = raw, "invalid max_service_body_bytes"),
    }
}

pub fn parse_user_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
