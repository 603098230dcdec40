//! Prompt playback and DTMF collection sessions for ARI-style PBX control.
//!
//! The crate drives audio prompts over any transport that implements the
//! [`player`] capability traits: it stages playbacks, walks a replayable URI
//! queue, collects digits with pluggable match functions, and turns the
//! whole exchange into a single [`play::PlayResult`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rustari::play::{matcher, play, PlayOptions};
//! use rustari::player::Player;
//!
//! async fn collect_extension(ari: Arc<dyn Player>) -> String {
//!     let session = play(
//!         ari,
//!         PlayOptions::prompt()
//!             .with_uri("sound:please-enter-your")
//!             .with_uri("sound:extension")
//!             .with_match(matcher::match_hash())
//!             .with_replays(2),
//!     );
//!     session.result().await.dtmf
//! }
//! ```
//!
//! Sessions can be exercised end to end without a PBX through
//! [`testing::MockAri`].

pub mod event;
pub mod play;
pub mod player;
pub mod testing;

/// Caller-chosen playback identifier, unique per staged clip.
pub type PlaybackId = String;
/// Media locator understood by the transport, e.g. `sound:tt-monkeys`.
pub type MediaUri = String;
