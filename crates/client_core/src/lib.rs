pub mod error;
pub mod media;
pub mod media_state;
pub mod paginator;
pub mod transport;

pub use error::{DecodeError, PaginationError};
pub use media::{decode_page, MediaItem, Thumbnail};
pub use media_state::{MediaListEvent, MediaListState};
pub use paginator::{
    AlbumPaginator, AlbumSummary, ErrorSink, LoadOutcome, PaginatorConfig, PaginatorStatus,
    RemoteAlbumClient, SkipReason, SubAlbumSummary, TracingErrorSink, DEFAULT_LOOKAHEAD,
    DEFAULT_PAGE_LIMIT,
};
pub use transport::GraphqlAlbumClient;
