//! Session outcome model: status codes, match results, errors, and the
//! final [`PlayResult`] snapshot handed to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle status of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The session is still running.
    InProgress,
    /// Playback (and any digit match) completed normally.
    Finished,
    /// The session was stopped by its caller or a parent cancellation.
    Cancelled,
    /// A playback could not be staged or started.
    Failed,
    /// The far end hung up while the session was running.
    Hangup,
    /// A timeout clock fired: playback start, maximum playback time, or the
    /// digit-wait clocks with no match across all replays.
    Timeout,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InProgress => write!(f, "in_progress"),
            Status::Finished => write!(f, "finished"),
            Status::Cancelled => write!(f, "cancelled"),
            Status::Failed => write!(f, "failed"),
            Status::Hangup => write!(f, "hangup"),
            Status::Timeout => write!(f, "timeout"),
        }
    }
}

/// Verdict of a match function over the digits collected so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    /// More digits could still produce a match.
    #[default]
    Incomplete,
    /// The pattern matched; the session can finish.
    Complete,
    /// No further input can ever match.
    Invalid,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Incomplete => write!(f, "incomplete"),
            MatchResult::Complete => write!(f, "complete"),
            MatchResult::Invalid => write!(f, "invalid"),
        }
    }
}

/// Errors a playback session can finish with.
#[derive(Debug, Error)]
pub enum PlayError {
    /// The transport refused to stage a playback.
    #[error("failed to stage playback of {uri}")]
    Stage {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    /// The transport staged the playback but could not start it.
    #[error("failed to start playback of {uri}")]
    Exec {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    /// No `PlaybackStarted` arrived within the per-clip start timeout.
    #[error("timeout waiting for start of playback")]
    PlaybackStartTimeout,

    /// The whole-session playback watchdog fired.
    #[error("maximum playback time exceeded")]
    MaxPlaybackTime,

    /// The session was cancelled from outside before it could finish.
    #[error("context canceled")]
    Cancelled,

    /// The session was started with no audio URIs at all.
    #[error("no audio URIs to play")]
    NoAudio,
}

/// Final snapshot of a playback session.
///
/// `dtmf` holds the digits as rewritten by the match function (e.g. with a
/// terminator stripped), while `digits_received` counts every digit the far
/// end actually sent over the session's lifetime, replays included.
#[derive(Debug, Clone)]
pub struct PlayResult {
    /// Wall-clock time from session start to the terminal status.
    pub duration: Duration,
    /// Collected digits, after any match-function rewrite.
    pub dtmf: String,
    /// Raw count of digits received, regardless of rewrites or replays.
    pub digits_received: usize,
    /// Verdict of the last match-function application.
    pub match_result: MatchResult,
    /// Terminal status of the session.
    pub status: Status,
    /// The error that ended the session, if any.
    pub error: Option<Arc<PlayError>>,
}
