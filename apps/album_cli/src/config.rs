use std::{collections::HashMap, fs};

use client_core::{DEFAULT_LOOKAHEAD, DEFAULT_PAGE_LIMIT};

pub const CONFIG_FILE: &str = "album_cli.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub graphql_url: String,
    pub auth_token: Option<String>,
    pub page_limit: u32,
    pub lookahead: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graphql_url: "http://localhost:4001/api/graphql".into(),
            auth_token: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(CONFIG_FILE).ok();
    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the flat `key = "value"` config file, then environment.
pub fn settings_from_sources(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("graphql_url") {
                settings.graphql_url = v.clone();
            }
            if let Some(v) = file_cfg.get("auth_token") {
                settings.auth_token = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("page_limit") {
                apply_page_limit(&mut settings, v);
            }
            if let Some(v) = file_cfg.get("lookahead") {
                apply_lookahead(&mut settings, v);
            }
        }
    }

    if let Some(v) = env("GRAPHQL_URL") {
        settings.graphql_url = v;
    }
    if let Some(v) = env("APP__GRAPHQL_URL") {
        settings.graphql_url = v;
    }

    if let Some(v) = env("APP__AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }

    if let Some(v) = env("APP__PAGE_LIMIT") {
        apply_page_limit(&mut settings, &v);
    }
    if let Some(v) = env("APP__LOOKAHEAD") {
        apply_lookahead(&mut settings, &v);
    }

    settings
}

fn apply_page_limit(settings: &mut Settings, raw: &str) {
    if let Ok(parsed) = raw.trim().parse::<u32>() {
        if parsed > 0 {
            settings.page_limit = parsed;
        }
    }
}

fn apply_lookahead(settings: &mut Settings, raw: &str) {
    if let Ok(parsed) = raw.trim().parse::<usize>() {
        if parsed > 0 {
            settings.lookahead = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
