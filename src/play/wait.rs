//! Digit-wait state: three clocks racing one signal channel.

use super::matcher::MatchFn;
use super::result::MatchResult;
use super::session::SessionShared;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    /// The match function reported a complete pattern.
    Matched,
    /// The match function reported the pattern can never complete.
    Invalid,
    /// The idle or overall clock expired first.
    TimedOut,
    /// The session was cancelled while waiting.
    Cancelled,
}

/// Wait for digits until the match function decides or a clock runs out.
///
/// The idle clock starts at `first_digit_timeout` and drops to
/// `inter_digit_timeout` once a digit has been seen; it restarts on every
/// digit signal. The overall clock never restarts. Digits that arrived
/// during playback (barge-in) are already in the signal channel and are
/// matched immediately, before any clock can expire.
pub(crate) async fn wait_digits(
    shared: &SessionShared,
    digit_rx: &mut mpsc::Receiver<()>,
    match_fn: &MatchFn,
    first_digit_timeout: Duration,
    inter_digit_timeout: Duration,
    overall_timeout: Duration,
) -> WaitOutcome {
    let overall = tokio::time::sleep(overall_timeout);
    tokio::pin!(overall);

    let mut idle_timeout = first_digit_timeout;

    loop {
        let idle = tokio::time::sleep(idle_timeout);
        tokio::pin!(idle);

        tokio::select! {
            _ = shared.root.cancelled() => return WaitOutcome::Cancelled,
            _ = &mut overall => {
                debug!(session_id = %shared.id, "overall digit timeout");
                return WaitOutcome::TimedOut;
            }
            _ = &mut idle => {
                debug!(session_id = %shared.id, ?idle_timeout, "digit timeout");
                return WaitOutcome::TimedOut;
            }
            signal = digit_rx.recv() => {
                if signal.is_none() {
                    return WaitOutcome::Cancelled;
                }
                match shared.apply_match(match_fn) {
                    MatchResult::Complete => return WaitOutcome::Matched,
                    MatchResult::Invalid => return WaitOutcome::Invalid,
                    MatchResult::Incomplete => idle_timeout = inter_digit_timeout,
                }
            }
        }
    }
}
