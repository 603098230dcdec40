//! Append-only URI queue with a replayable cursor.

use crate::MediaUri;
use std::sync::Mutex;

/// The list of media URIs a session plays, in order.
///
/// URIs may be appended at any time, including while a pass is in flight:
/// anything appended behind the cursor is picked up before the current pass
/// ends. Replays rewind the cursor with [`AudioQueue::first`] and walk the
/// queue again with [`AudioQueue::next`].
#[derive(Debug, Default)]
pub struct AudioQueue {
    inner: Mutex<QueueInner>,
}

#[derive(Debug, Default)]
struct QueueInner {
    uris: Vec<MediaUri>,
    cursor: usize,
}

impl AudioQueue {
    pub fn new(uris: Vec<MediaUri>) -> Self {
        Self {
            inner: Mutex::new(QueueInner { uris, cursor: 0 }),
        }
    }

    /// Append a single URI.
    pub fn add(&self, uri: impl Into<MediaUri>) {
        self.inner.lock().unwrap().uris.push(uri.into());
    }

    /// Append several URIs, preserving their order.
    pub fn add_all<I, S>(&self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<MediaUri>,
    {
        let mut inner = self.inner.lock().unwrap();
        inner.uris.extend(uris.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().uris.is_empty()
    }

    /// Rewind the cursor and return the first URI, if any.
    pub(crate) fn first(&self) -> Option<MediaUri> {
        let mut inner = self.inner.lock().unwrap();
        inner.cursor = 0;
        inner.uris.first().cloned()
    }

    /// Advance the cursor and return the URI under it. Returns `None` when
    /// the pass has consumed the whole queue. Only meaningful after `first`.
    pub(crate) fn next(&self) -> Option<MediaUri> {
        let mut inner = self.inner.lock().unwrap();
        if inner.cursor < inner.uris.len() {
            inner.cursor += 1;
        }
        inner.uris.get(inner.cursor).cloned()
    }
}
