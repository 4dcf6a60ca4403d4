use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed media record: {0}")]
    Record(#[source] serde_json::Error),
    #[error("malformed media record at position {index} of page: {source}")]
    PageRecord {
        index: usize,
        source: serde_json::Error,
    },
}

/// Failure of a single `load_more` step. Never escapes the paginator as an
/// `Err`; it is reported to the error sink and returned inside the outcome.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("failed to decode page of album {album_id}: {source}")]
    Decode {
        album_id: String,
        source: DecodeError,
    },
    #[error("failed to fetch page of album {album_id} at offset {offset}: {source:#}")]
    Transport {
        album_id: String,
        offset: u32,
        source: anyhow::Error,
    },
}

impl PaginationError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
