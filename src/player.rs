//! Transport capabilities the playback engine is written against.
//!
//! The engine never talks HTTP or websocket itself. A gateway (or the
//! in-memory [`crate::testing::MockAri`] harness) implements these traits and
//! the engine drives everything through them, so sessions can be exercised
//! without any live ARI connection.

use crate::event::{Event, EventKind};
use anyhow::Result;
use async_trait::async_trait;

/// A live event subscription.
///
/// `recv` yields the next matching event, or `None` when the transport has
/// torn the subscription down. `None` is not a session-terminal signal:
/// callers park and let their cancellation token or timeout clocks decide
/// when to give up.
#[async_trait]
pub trait Subscription: Send {
    async fn recv(&mut self) -> Option<Event>;

    /// Release the subscription. Must be idempotent.
    fn cancel(&mut self);
}

/// Anything that can hand out event subscriptions for a channel.
pub trait Subscriber: Send + Sync {
    /// Subscribe to the given event kinds. Events of other kinds are never
    /// delivered on the returned subscription.
    fn subscribe(&self, kinds: &[EventKind]) -> Box<dyn Subscription>;
}

/// A control surface that can stage and run playbacks on a channel or bridge.
#[async_trait]
pub trait Player: Subscriber {
    /// Stage a playback of `media_uri` under the caller-chosen `playback_id`
    /// without starting it. The returned handle is used to subscribe to the
    /// playback's events before any audio moves.
    async fn stage_play(&self, playback_id: &str, media_uri: &str)
        -> Result<Box<dyn PlaybackHandle>>;
}

/// A staged playback.
#[async_trait]
pub trait PlaybackHandle: Send + Sync {
    fn id(&self) -> &str;

    /// Start the staged playback on the far end.
    async fn exec(&self) -> Result<()>;

    /// Stop the playback if it is still running.
    async fn stop(&self) -> Result<()>;

    /// Subscribe to one event kind, scoped to this playback.
    fn subscribe(&self, kind: EventKind) -> Box<dyn Subscription>;
}
