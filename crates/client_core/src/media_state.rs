use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::media::MediaItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaListEvent {
    /// A new session started; the list is empty and the cursor is at 0.
    Reset,
    Appended {
        start: usize,
        count: usize,
    },
    /// The album no longer resolves; the list is gone, not just empty.
    Cleared,
    ActiveIndexChanged(usize),
    FullScreenChanged(bool),
}

/// Observable media list shared between an album paginator and whatever
/// renders it. One instance per album screen.
pub struct MediaListState {
    inner: RwLock<MediaListInner>,
    events: broadcast::Sender<MediaListEvent>,
}

struct MediaListInner {
    items: Option<Vec<MediaItem>>,
    active_index: usize,
    full_screen: bool,
}

impl MediaListState {
    pub fn new() -> Arc<Self> {
        Self::with_items(None, 0)
    }

    pub fn with_items(items: Option<Vec<MediaItem>>, active_index: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            inner: RwLock::new(MediaListInner {
                items,
                active_index,
                full_screen: false,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaListEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the loaded items; `None` once the album stopped resolving.
    pub async fn items(&self) -> Option<Vec<MediaItem>> {
        self.inner.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.items.as_ref().map_or(0, Vec::len)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_cleared(&self) -> bool {
        self.inner.read().await.items.is_none()
    }

    pub async fn active_index(&self) -> usize {
        self.inner.read().await.active_index
    }

    /// Returns `None` instead of panicking when the cursor is out of range.
    pub async fn active_item(&self) -> Option<MediaItem> {
        let guard = self.inner.read().await;
        guard
            .items
            .as_ref()
            .and_then(|items| items.get(guard.active_index))
            .cloned()
    }

    /// Moves the cursor, clamped to the loaded range. Returns the stored index.
    pub async fn set_active_index(&self, index: usize) -> usize {
        let stored = {
            let mut guard = self.inner.write().await;
            let len = guard.items.as_ref().map_or(0, Vec::len);
            let clamped = index.min(len.saturating_sub(1));
            if guard.active_index == clamped {
                return clamped;
            }
            guard.active_index = clamped;
            clamped
        };
        let _ = self.events.send(MediaListEvent::ActiveIndexChanged(stored));
        stored
    }

    pub async fn is_full_screen(&self) -> bool {
        self.inner.read().await.full_screen
    }

    pub async fn set_full_screen(&self, full_screen: bool) {
        {
            let mut guard = self.inner.write().await;
            if guard.full_screen == full_screen {
                return;
            }
            guard.full_screen = full_screen;
        }
        let _ = self
            .events
            .send(MediaListEvent::FullScreenChanged(full_screen));
    }

    pub async fn toggle_full_screen(&self) -> bool {
        let full_screen = {
            let mut guard = self.inner.write().await;
            guard.full_screen = !guard.full_screen;
            guard.full_screen
        };
        let _ = self
            .events
            .send(MediaListEvent::FullScreenChanged(full_screen));
        full_screen
    }

    /// Prefetch heuristic: true when `index` is within `threshold` items of
    /// the end of the loaded list. Always false once the list is cleared.
    pub async fn is_near_end(&self, index: usize, threshold: usize) -> bool {
        match self.inner.read().await.items.as_ref() {
            Some(items) => items.len().saturating_sub(index) < threshold,
            None => false,
        }
    }

    pub(crate) async fn reset(&self) {
        {
            let mut guard = self.inner.write().await;
            guard.items = Some(Vec::new());
            guard.active_index = 0;
        }
        let _ = self.events.send(MediaListEvent::Reset);
    }

    /// Appends after the existing prefix. Returns the new length.
    pub(crate) async fn append(&self, new_items: Vec<MediaItem>) -> usize {
        let count = new_items.len();
        let (start, total) = {
            let mut guard = self.inner.write().await;
            let items = guard.items.get_or_insert_with(Vec::new);
            let start = items.len();
            items.extend(new_items);
            (start, items.len())
        };
        if count > 0 {
            let _ = self.events.send(MediaListEvent::Appended { start, count });
        }
        total
    }

    pub(crate) async fn clear(&self) {
        self.inner.write().await.items = None;
        let _ = self.events.send(MediaListEvent::Cleared);
    }
}

#[cfg(test)]
#[path = "tests/media_state_tests.rs"]
mod tests;
