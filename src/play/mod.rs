//! # Prompt Playback Sessions
//!
//! Queue-based audio playback with optional DTMF collection, built on the
//! [`crate::player`] capability traits.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ PlaySession (caller handle)                            │
//! │  add / add_all │ stop_audio │ stop │ result │ done     │
//! └────────────────────────────────────────────────────────┘
//!                          ▲
//! ┌────────────────────────────────────────────────────────┐
//! │ Session supervisor                                     │
//! │  replay loop ─ one Sequence + one digit wait per pass  │
//! │  DTMF listener ─ digits, barge-in, hangup              │
//! │  watchdog ─ maximum playback time                      │
//! └────────────────────────────────────────────────────────┘
//!                          ▲ stage / exec / stop
//! ┌────────────────────────────────────────────────────────┐
//! │ Transport (Player + Subscriber impl)                   │
//! │  ARI gateway │ MockAri test harness                    │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. [`play`] snapshots the options, subscribes to channel events, and
//!    spawns the supervisor. It never blocks.
//! 2. Each pass plays the queue front to back. Every clip is staged, its
//!    playback events subscribed, and only then started.
//! 3. When a match function is configured, a digit wait follows each pass:
//!    first/inter-digit clocks plus an overall cap. Digits arriving during
//!    audio barge in and stop the current pass only.
//! 4. An expired or invalid wait replays the queue while replays remain;
//!    without a match function the passes run back-to-back. A complete
//!    match, a hangup, a failure, the watchdog, or [`PlaySession::stop`]
//!    ends the session.
//! 5. The terminal status is assigned exactly once; [`PlaySession::result`]
//!    waits for full teardown and returns the frozen snapshot.
//!
//! ## Timeout clocks
//!
//! | Clock | Scope | On expiry |
//! |-------|-------|-----------|
//! | playback start | one staged clip | clip fails with `Timeout` |
//! | maximum playback time | whole session | session fails with `Timeout` |
//! | first digit | one digit wait | wait expires |
//! | inter digit | one digit wait | wait expires |
//! | overall digit | one digit wait | wait expires |

mod clip;
mod dtmf;
pub mod matcher;
mod options;
mod queue;
mod result;
mod sequence;
mod session;
mod wait;


pub use matcher::MatchFn;
pub use options::{
    PlayOptions, DEFAULT_FIRST_DIGIT_TIMEOUT, DEFAULT_INTER_DIGIT_TIMEOUT,
    DEFAULT_MAX_PLAYBACK_TIME, DEFAULT_OVERALL_DIGIT_TIMEOUT, DEFAULT_PLAYBACK_START_TIMEOUT,
};
pub use queue::AudioQueue;
pub use result::{MatchResult, PlayError, PlayResult, Status};
pub use session::{play, PlaySession};
