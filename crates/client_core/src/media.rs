use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use shared::domain::MediaId;

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    #[serde(default, rename = "blurhash")]
    pub blur_hash: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl MediaItem {
    /// Decodes one raw server record. Unknown fields such as `__typename`
    /// are ignored; missing or mistyped known fields are an error.
    pub fn decode(raw: &serde_json::Value) -> Result<Self, DecodeError> {
        Self::deserialize(raw).map_err(DecodeError::Record)
    }
}

/// All-or-nothing: the first malformed record fails the whole page.
pub fn decode_page(records: &[serde_json::Value]) -> Result<Vec<MediaItem>, DecodeError> {
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            MediaItem::deserialize(raw).map_err(|source| DecodeError::PageRecord { index, source })
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
