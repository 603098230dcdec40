//! Session configuration.

use super::matcher::{self, MatchFn};
use crate::MediaUri;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long a staged clip may take to report `PlaybackStarted`.
pub const DEFAULT_PLAYBACK_START_TIMEOUT: Duration = Duration::from_secs(2);
/// Whole-session playback watchdog.
pub const DEFAULT_MAX_PLAYBACK_TIME: Duration = Duration::from_secs(600);
/// How long to wait for the first digit after a pass ends.
pub const DEFAULT_FIRST_DIGIT_TIMEOUT: Duration = Duration::from_secs(4);
/// How long to wait between digits.
pub const DEFAULT_INTER_DIGIT_TIMEOUT: Duration = Duration::from_secs(3);
/// Upper bound on a single digit-wait, regardless of typing speed.
pub const DEFAULT_OVERALL_DIGIT_TIMEOUT: Duration = Duration::from_secs(180);

/// Options for [`super::play`].
///
/// Built with the consuming `with_*` setters:
///
/// ```rust
/// use rustari::play::{matcher, PlayOptions};
/// use std::time::Duration;
///
/// let opts = PlayOptions::prompt()
///     .with_uri("sound:please-enter-your")
///     .with_uri("sound:extension")
///     .with_match(matcher::match_hash())
///     .with_replays(2)
///     .with_digit_timeouts(
///         Duration::from_secs(5),
///         Duration::from_secs(3),
///         Duration::from_secs(60),
///     );
/// # drop(opts);
/// ```
#[derive(Clone)]
pub struct PlayOptions {
    pub(crate) uris: Vec<MediaUri>,
    pub(crate) playback_start_timeout: Duration,
    pub(crate) max_playback_time: Duration,
    pub(crate) first_digit_timeout: Duration,
    pub(crate) inter_digit_timeout: Duration,
    pub(crate) overall_digit_timeout: Duration,
    pub(crate) replays: usize,
    pub(crate) match_fn: Option<MatchFn>,
    pub(crate) cancel_token: Option<CancellationToken>,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            uris: Vec::new(),
            playback_start_timeout: DEFAULT_PLAYBACK_START_TIMEOUT,
            max_playback_time: DEFAULT_MAX_PLAYBACK_TIME,
            first_digit_timeout: DEFAULT_FIRST_DIGIT_TIMEOUT,
            inter_digit_timeout: DEFAULT_INTER_DIGIT_TIMEOUT,
            overall_digit_timeout: DEFAULT_OVERALL_DIGIT_TIMEOUT,
            replays: 0,
            match_fn: None,
            cancel_token: None,
        }
    }
}

impl fmt::Debug for PlayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayOptions")
            .field("uris", &self.uris)
            .field("playback_start_timeout", &self.playback_start_timeout)
            .field("max_playback_time", &self.max_playback_time)
            .field("first_digit_timeout", &self.first_digit_timeout)
            .field("inter_digit_timeout", &self.inter_digit_timeout)
            .field("overall_digit_timeout", &self.overall_digit_timeout)
            .field("replays", &self.replays)
            .field("match_fn", &self.match_fn.as_ref().map(|_| "…"))
            .finish()
    }
}

impl PlayOptions {
    /// Pure playback: play the queue, collect no digits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompt preset: playback that exits on the first digit. Override the
    /// match function with [`PlayOptions::with_match`] for longer patterns.
    pub fn prompt() -> Self {
        Self {
            match_fn: Some(matcher::match_any()),
            ..Self::default()
        }
    }

    /// Append a media URI to the initial queue.
    pub fn with_uri(mut self, uri: impl Into<MediaUri>) -> Self {
        self.uris.push(uri.into());
        self
    }

    /// Append several media URIs to the initial queue.
    pub fn with_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MediaUri>,
    {
        self.uris.extend(uris.into_iter().map(Into::into));
        self
    }

    /// How long each staged clip may take to report `PlaybackStarted`.
    pub fn with_playback_start_timeout(mut self, timeout: Duration) -> Self {
        self.playback_start_timeout = timeout;
        self
    }

    /// Whole-session watchdog: the session finishes with
    /// [`super::Status::Timeout`] when this elapses first.
    pub fn with_max_playback_time(mut self, timeout: Duration) -> Self {
        self.max_playback_time = timeout;
        self
    }

    /// The three digit-wait clocks: before the first digit, between digits,
    /// and the overall cap on one digit-wait.
    pub fn with_digit_timeouts(mut self, first: Duration, inter: Duration, overall: Duration) -> Self {
        self.first_digit_timeout = first;
        self.inter_digit_timeout = inter;
        self.overall_digit_timeout = overall;
        self
    }

    /// How many extra passes over the queue may run: after a digit-wait
    /// expires without a match, or back-to-back when no match function is
    /// set. `0` plays the queue exactly once.
    pub fn with_replays(mut self, replays: usize) -> Self {
        self.replays = replays;
        self
    }

    /// Collect digits with the given match function. Any digit barges in on
    /// running audio.
    pub fn with_match(mut self, match_fn: MatchFn) -> Self {
        self.match_fn = Some(match_fn);
        self
    }

    /// Disable digit collection: digits are still recorded but never stop
    /// audio or complete the session.
    pub fn no_exit_on_dtmf(mut self) -> Self {
        self.match_fn = None;
        self
    }

    /// Tie the session to a parent token; cancelling it cancels the session.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}
