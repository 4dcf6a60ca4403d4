use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of a GraphQL response `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
#[error("graphql request failed: {}", join_messages(.errors))]
pub struct GraphqlException {
    pub errors: Vec<GraphqlError>,
}

impl GraphqlException {
    pub fn new(errors: Vec<GraphqlError>) -> Self {
        Self { errors }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.errors.iter().any(|err| {
            let lower = err.message.to_ascii_lowercase();
            lower.contains("unauthorized") || lower.contains("not authorized")
        })
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|err| err.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
