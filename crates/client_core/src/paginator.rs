use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{ensure, Result};
use async_trait::async_trait;
use shared::{
    domain::AlbumId,
    protocol::{AlbumPageData, AlbumPayload},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    error::PaginationError,
    media::decode_page,
    media_state::MediaListState,
};

pub const DEFAULT_PAGE_LIMIT: u32 = 200;
pub const DEFAULT_LOOKAHEAD: usize = 20;

#[async_trait]
pub trait RemoteAlbumClient: Send + Sync {
    /// `album` in the returned page is `None` when the album no longer exists.
    async fn fetch_album_page(
        &self,
        album_id: &AlbumId,
        limit: u32,
        offset: u32,
    ) -> Result<AlbumPageData>;
}

pub trait ErrorSink: Send + Sync {
    fn report(&self, message: &str, error: &PaginationError);
}

pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, message: &str, error: &PaginationError) {
        error!("{message}: {error}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorConfig {
    pub limit: u32,
    pub lookahead: usize,
}

impl PaginatorConfig {
    pub fn new(limit: u32, lookahead: usize) -> Result<Self> {
        ensure!(limit > 0, "page limit must be greater than zero");
        ensure!(lookahead > 0, "lookahead must be greater than zero");
        Ok(Self { limit, lookahead })
    }
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSummary {
    pub id: AlbumId,
    pub title: String,
    pub sub_albums: Vec<SubAlbumSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAlbumSummary {
    pub id: AlbumId,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

impl From<&AlbumPayload> for AlbumSummary {
    fn from(album: &AlbumPayload) -> Self {
        Self {
            id: album.id.clone(),
            title: album.title.clone(),
            sub_albums: album
                .sub_albums
                .iter()
                .map(|sub| SubAlbumSummary {
                    id: sub.id.clone(),
                    title: sub.title.clone(),
                    thumbnail_url: sub.thumbnail_url().map(str::to_string),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSession,
    Exhausted,
    InFlight,
    NotNearEnd,
    AlreadyLoaded,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Appended { count: usize, total: usize },
    /// An empty page arrived; no further page will be requested this session.
    Exhausted,
    AlbumGone,
    Skipped(SkipReason),
    Failed(PaginationError),
}

impl LoadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorStatus {
    pub offset: u32,
    pub has_more: bool,
    pub is_loading: bool,
}

pub struct AlbumPaginator {
    client: Arc<dyn RemoteAlbumClient>,
    error_sink: Arc<dyn ErrorSink>,
    media: Arc<MediaListState>,
    config: PaginatorConfig,
    inner: Mutex<PaginatorState>,
    /// Held by at most one fetch; see `InFlight`.
    loading: AtomicBool,
}

struct PaginatorState {
    album_id: Option<AlbumId>,
    album: Option<AlbumSummary>,
    offset: u32,
    has_more: bool,
    generation: u64,
}

/// Marks the paginator as loading until dropped, so the flag is released
/// on every exit path of `load_more`, including a cancelled future.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl AlbumPaginator {
    pub fn new(client: Arc<dyn RemoteAlbumClient>, media: Arc<MediaListState>) -> Arc<Self> {
        Self::new_with_dependencies(
            client,
            Arc::new(TracingErrorSink),
            media,
            PaginatorConfig::default(),
        )
    }

    pub fn new_with_dependencies(
        client: Arc<dyn RemoteAlbumClient>,
        error_sink: Arc<dyn ErrorSink>,
        media: Arc<MediaListState>,
        config: PaginatorConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            error_sink,
            media,
            config,
            inner: Mutex::new(PaginatorState {
                album_id: None,
                album: None,
                offset: 0,
                has_more: true,
                generation: 0,
            }),
            loading: AtomicBool::new(false),
        })
    }

    pub fn media(&self) -> Arc<MediaListState> {
        Arc::clone(&self.media)
    }

    pub fn config(&self) -> PaginatorConfig {
        self.config
    }

    pub async fn album_id(&self) -> Option<AlbumId> {
        self.inner.lock().await.album_id.clone()
    }

    /// Metadata from the latest successful page of the current session.
    pub async fn album(&self) -> Option<AlbumSummary> {
        self.inner.lock().await.album.clone()
    }

    pub async fn status(&self) -> PaginatorStatus {
        let guard = self.inner.lock().await;
        PaginatorStatus {
            offset: guard.offset,
            has_more: guard.has_more,
            is_loading: self.loading.load(Ordering::Acquire),
        }
    }

    /// Resets the session and loads the first page. If a page from the
    /// previous session is still in flight this returns
    /// `Skipped(InFlight)`; that page is discarded when it lands and the
    /// new session's first page is fetched in its place.
    pub async fn start_session(&self, album_id: AlbumId) -> LoadOutcome {
        {
            let mut guard = self.inner.lock().await;
            guard.generation += 1;
            guard.album_id = Some(album_id.clone());
            guard.album = None;
            guard.offset = 0;
            guard.has_more = true;
            self.media.reset().await;
        }
        info!(album_id = %album_id, limit = self.config.limit, "album: session started");
        self.load_more().await
    }

    /// Starts a session unless this album's first page already loaded.
    pub async fn ensure_session(&self, album_id: AlbumId) -> LoadOutcome {
        {
            let guard = self.inner.lock().await;
            if guard.album_id.as_ref() == Some(&album_id) && guard.album.is_some() {
                return LoadOutcome::Skipped(SkipReason::AlreadyLoaded);
            }
        }
        self.start_session(album_id).await
    }

    /// Scroll hook: loads the next page only when `index` is within the
    /// lookahead threshold of the end of the loaded list.
    pub async fn load_more_near(&self, index: usize) -> LoadOutcome {
        if !self.media.is_near_end(index, self.config.lookahead).await {
            return LoadOutcome::Skipped(SkipReason::NotNearEnd);
        }
        self.load_more().await
    }

    pub async fn load_more(&self) -> LoadOutcome {
        loop {
            let (album_id, offset, generation, in_flight) = {
                let guard = self.inner.lock().await;
                let Some(album_id) = guard.album_id.clone() else {
                    return LoadOutcome::Skipped(SkipReason::NoSession);
                };
                if !guard.has_more {
                    debug!(album_id = %album_id, "album: exhausted; ignoring load more");
                    return LoadOutcome::Skipped(SkipReason::Exhausted);
                }
                let Some(in_flight) = InFlight::acquire(&self.loading) else {
                    debug!(
                        album_id = %album_id,
                        offset = guard.offset,
                        "album: page already in flight; skipping duplicate trigger"
                    );
                    return LoadOutcome::Skipped(SkipReason::InFlight);
                };
                (album_id, guard.offset, guard.generation, in_flight)
            };

            let result = self.fetch_page(&album_id, offset, generation).await;
            drop(in_flight);

            match result {
                Ok(Some(outcome)) => return outcome,
                Ok(None) => {}
                Err(err) => {
                    if self.inner.lock().await.generation == generation {
                        self.error_sink
                            .report(&format!("Failed to fetch album: {album_id}"), &err);
                        return LoadOutcome::Failed(err);
                    }
                }
            }

            // The session restarted while this page was in flight, and the
            // restart could not fetch; load its first page now.
            debug!(album_id = %album_id, "album: dropped page from a previous session");
        }
    }

    async fn fetch_page(
        &self,
        album_id: &AlbumId,
        offset: u32,
        generation: u64,
    ) -> Result<Option<LoadOutcome>, PaginationError> {
        let limit = self.config.limit;
        let page = self
            .client
            .fetch_album_page(album_id, limit, offset)
            .await
            .map_err(|source| PaginationError::Transport {
                album_id: album_id.to_string(),
                offset,
                source,
            })?;

        let Some(album) = page.album else {
            let mut guard = self.inner.lock().await;
            if guard.generation != generation {
                return Ok(None);
            }
            warn!(album_id = %album_id, "album: no longer resolves; clearing media");
            guard.album = None;
            self.media.clear().await;
            return Ok(Some(LoadOutcome::AlbumGone));
        };

        let items = decode_page(&album.media).map_err(|source| PaginationError::Decode {
            album_id: album_id.to_string(),
            source,
        })?;

        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            return Ok(None);
        }
        guard.album = Some(AlbumSummary::from(&album));
        match guard.offset.checked_add(limit) {
            Some(next) => guard.offset = next,
            None => {
                warn!(
                    album_id = %album_id,
                    offset,
                    limit,
                    "album: offset overflow; stopping pagination"
                );
                guard.has_more = false;
            }
        }

        if items.is_empty() {
            guard.has_more = false;
            info!(album_id = %album_id, offset, "album: empty page; no more media to load");
            return Ok(Some(LoadOutcome::Exhausted));
        }

        let count = items.len();
        let total = self.media.append(items).await;
        info!(album_id = %album_id, "load more appended, new size: {total}");
        Ok(Some(LoadOutcome::Appended { count, total }))
    }
}

#[cfg(test)]
#[path = "tests/paginator_tests.rs"]
mod tests;
