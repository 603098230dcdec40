//! Test harness for playback sessions.
//!
//! Provides [`MockAri`]: a fully assembled in-memory ARI stand-in that runs
//! sessions without any real PBX, HTTP client, or websocket.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rustari::play::{play, PlayOptions};
//! use rustari::testing::MockAri;
//!
//! let ari = MockAri::new();
//! let session = play(Arc::new(ari.clone()), PlayOptions::new().with_uri("sound:hello"));
//!
//! // The engine stages and execs the clip → drive it to completion.
//! let p = ari.next_play(100).await.expect("clip staged");
//! ari.playback_started(&p.playback_id);
//! ari.playback_finished(&p.playback_id);
//!
//! let result = session.result().await;
//! ```

use crate::event::{Event, EventKind};
use crate::player::{PlaybackHandle, Player, Subscriber, Subscription};
use crate::{MediaUri, PlaybackId};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// A playback the engine has staged and started.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedPlay {
    pub playback_id: PlaybackId,
    pub uri: MediaUri,
}

#[derive(Default)]
struct Records {
    staged: Vec<StagedPlay>,
    executed: Vec<PlaybackId>,
    stopped: Vec<PlaybackId>,
}

struct AriInner {
    bus: broadcast::Sender<Event>,
    execs_tx: mpsc::UnboundedSender<StagedPlay>,
    execs_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<StagedPlay>>,
    records: Mutex<Records>,
    subs_opened: AtomicUsize,
    subs_released: AtomicUsize,
}

/// In-memory ARI transport: event injection on one side, command
/// observation on the other.
///
/// Cloning is cheap and every clone drives the same transport, so a test
/// can move one clone into [`crate::play::play`] and keep another for
/// injecting events.
#[derive(Clone)]
pub struct MockAri {
    inner: Arc<AriInner>,
}

impl Default for MockAri {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAri {
    pub fn new() -> Self {
        let (bus, _) = broadcast::channel(64);
        let (execs_tx, execs_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(AriInner {
                bus,
                execs_tx,
                execs_rx: tokio::sync::Mutex::new(execs_rx),
                records: Mutex::new(Records::default()),
                subs_opened: AtomicUsize::new(0),
                subs_released: AtomicUsize::new(0),
            }),
        }
    }

    // ── Event injection ────────────────────────────────────────────────────

    /// Inject a raw event.
    pub fn emit(&self, event: Event) -> &Self {
        let _ = self.inner.bus.send(event);
        self
    }

    /// The far end reports a playback has started.
    pub fn playback_started(&self, playback_id: &str) -> &Self {
        self.emit(Event::PlaybackStarted {
            playback_id: playback_id.to_string(),
        })
    }

    /// The far end reports a playback has finished.
    pub fn playback_finished(&self, playback_id: &str) -> &Self {
        self.emit(Event::PlaybackFinished {
            playback_id: playback_id.to_string(),
        })
    }

    /// The far end presses a DTMF key.
    pub fn dtmf(&self, digit: char) -> &Self {
        self.emit(Event::ChannelDtmfReceived {
            digit,
            duration_ms: 100,
        })
    }

    /// The far end presses a whole key string, in order.
    pub fn dtmf_string(&self, digits: &str) -> &Self {
        for digit in digits.chars() {
            self.dtmf(digit);
        }
        self
    }

    /// The far end hangs up.
    pub fn hangup(&self) -> &Self {
        self.emit(Event::ChannelHangupRequest)
    }

    /// The channel disappears entirely.
    pub fn destroy_channel(&self) -> &Self {
        self.emit(Event::ChannelDestroyed)
    }

    // ── Command observation ────────────────────────────────────────────────

    /// Wait up to `timeout_ms` milliseconds for the next playback the
    /// engine stages *and* starts. Returns `None` on timeout.
    ///
    /// The notification fires at exec time, after the engine has opened its
    /// playback subscriptions, so events emitted for the returned id cannot
    /// be lost.
    pub async fn next_play(&self, timeout_ms: u64) -> Option<StagedPlay> {
        let mut rx = self.inner.execs_rx.lock().await;
        tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Wait for the next playback and immediately run it to completion.
    pub async fn finish_next_play(&self, timeout_ms: u64) -> Option<StagedPlay> {
        let play = self.next_play(timeout_ms).await?;
        self.playback_started(&play.playback_id);
        self.playback_finished(&play.playback_id);
        Some(play)
    }

    /// Every playback staged so far, in order.
    pub fn staged(&self) -> Vec<StagedPlay> {
        self.inner.records.lock().unwrap().staged.clone()
    }

    /// Every playback exec'd so far, in order.
    pub fn executed(&self) -> Vec<PlaybackId> {
        self.inner.records.lock().unwrap().executed.clone()
    }

    /// Every playback the engine stopped early, in order.
    pub fn stopped(&self) -> Vec<PlaybackId> {
        self.inner.records.lock().unwrap().stopped.clone()
    }

    /// Subscriptions handed out so far.
    pub fn subscriptions_opened(&self) -> usize {
        self.inner.subs_opened.load(Ordering::SeqCst)
    }

    /// Subscriptions the engine has explicitly cancelled. Double cancels do
    /// not count twice.
    pub fn subscriptions_released(&self) -> usize {
        self.inner.subs_released.load(Ordering::SeqCst)
    }
}

impl AriInner {
    fn subscribe_scoped(
        inner: &Arc<Self>,
        kinds: Vec<EventKind>,
        scope: Option<PlaybackId>,
    ) -> Box<dyn Subscription> {
        inner.subs_opened.fetch_add(1, Ordering::SeqCst);
        Box::new(MockSubscription {
            kinds,
            scope,
            rx: inner.bus.subscribe(),
            inner: inner.clone(),
            cancelled: false,
        })
    }
}

impl Subscriber for MockAri {
    fn subscribe(&self, kinds: &[EventKind]) -> Box<dyn Subscription> {
        AriInner::subscribe_scoped(&self.inner, kinds.to_vec(), None)
    }
}

#[async_trait]
impl Player for MockAri {
    async fn stage_play(
        &self,
        playback_id: &str,
        media_uri: &str,
    ) -> Result<Box<dyn PlaybackHandle>> {
        let play = StagedPlay {
            playback_id: playback_id.to_string(),
            uri: media_uri.to_string(),
        };
        self.inner.records.lock().unwrap().staged.push(play.clone());
        Ok(Box::new(MockPlaybackHandle {
            play,
            inner: self.inner.clone(),
        }))
    }
}

struct MockPlaybackHandle {
    play: StagedPlay,
    inner: Arc<AriInner>,
}

#[async_trait]
impl PlaybackHandle for MockPlaybackHandle {
    fn id(&self) -> &str {
        &self.play.playback_id
    }

    async fn exec(&self) -> Result<()> {
        self.inner
            .records
            .lock()
            .unwrap()
            .executed
            .push(self.play.playback_id.clone());
        let _ = self.inner.execs_tx.send(self.play.clone());
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.inner
            .records
            .lock()
            .unwrap()
            .stopped
            .push(self.play.playback_id.clone());
        Ok(())
    }

    fn subscribe(&self, kind: EventKind) -> Box<dyn Subscription> {
        AriInner::subscribe_scoped(&self.inner, vec![kind], Some(self.play.playback_id.clone()))
    }
}

struct MockSubscription {
    kinds: Vec<EventKind>,
    /// When set, playback-scoped events for other playbacks are skipped.
    scope: Option<PlaybackId>,
    rx: broadcast::Receiver<Event>,
    inner: Arc<AriInner>,
    cancelled: bool,
}

#[async_trait]
impl Subscription for MockSubscription {
    async fn recv(&mut self) -> Option<Event> {
        if self.cancelled {
            return None;
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if !self.kinds.contains(&event.kind()) {
                        continue;
                    }
                    if let (Some(scope), Some(id)) = (&self.scope, event.playback_id()) {
                        if id != scope {
                            continue;
                        }
                    }
                    return Some(event);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            self.inner.subs_released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A subscription that was already torn down: `recv` always reports the
/// end of the stream. Handy for stubbing transports in unit tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosedSubscription;

#[async_trait]
impl Subscription for ClosedSubscription {
    async fn recv(&mut self) -> Option<Event> {
        None
    }

    fn cancel(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_filters_by_kind_and_scope() {
        let ari = MockAri::new();
        let mut sub = AriInner::subscribe_scoped(
            &ari.inner,
            vec![EventKind::PlaybackFinished],
            Some("play:a".to_string()),
        );

        ari.dtmf('1');
        ari.playback_finished("play:b");
        ari.playback_started("play:a");
        ari.playback_finished("play:a");

        let ev = sub.recv().await.expect("matching event");
        assert_eq!(
            ev,
            Event::PlaybackFinished {
                playback_id: "play:a".to_string()
            }
        );
        sub.cancel();
        assert_eq!(ari.subscriptions_opened(), 1);
        assert_eq!(ari.subscriptions_released(), 1);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let ari = MockAri::new();
        let mut sub = ari.subscribe(&[EventKind::ChannelDtmfReceived]);
        sub.cancel();
        sub.cancel();
        assert_eq!(ari.subscriptions_released(), 1);
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_next_play_fires_on_exec() {
        let ari = MockAri::new();

        let handle = ari.stage_play("play:x", "sound:x").await.unwrap();
        // Staged but not exec'd: nothing to observe yet.
        assert_eq!(ari.next_play(20).await, None);

        handle.exec().await.unwrap();
        let play = ari.next_play(20).await.expect("exec'd play");
        assert_eq!(play.playback_id, "play:x");
        assert_eq!(ari.executed(), vec!["play:x".to_string()]);
    }
}
