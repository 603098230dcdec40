//! Session controller: owns the queue, the result record, the replay loop,
//! the DTMF listener, and the playback watchdog.

use super::dtmf;
use super::matcher::MatchFn;
use super::options::PlayOptions;
use super::queue::AudioQueue;
use super::result::{MatchResult, PlayError, PlayResult, Status};
use super::sequence::Sequence;
use super::wait::{self, WaitOutcome};
use crate::event::EventKind;
use crate::player::{Player, Subscription};
use crate::MediaUri;
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Start a playback session and return a handle to it.
///
/// The session runs in background tasks on the current Tokio runtime; the
/// returned [`PlaySession`] is a cheap clonable handle for steering it and
/// collecting the result:
///
/// ```rust,no_run
/// # async fn demo(ari: std::sync::Arc<dyn rustari::player::Player>) {
/// use rustari::play::{matcher, play, PlayOptions, Status};
///
/// let session = play(
///     ari,
///     PlayOptions::prompt()
///         .with_uri("sound:enter-extension")
///         .with_match(matcher::match_hash())
///         .with_replays(2),
/// );
///
/// let result = session.result().await;
/// if result.status == Status::Finished {
///     println!("extension: {}", result.dtmf);
/// }
/// # }
/// ```
pub fn play(player: Arc<dyn Player>, options: PlayOptions) -> PlaySession {
    let (digit_tx, digit_rx) = mpsc::channel(1);
    let shared = SessionShared::new(&options, digit_tx);

    if shared.queue.is_empty() {
        warn!(session_id = %shared.id, "no audio URIs to play");
        shared.finish(Status::Failed, Some(PlayError::NoAudio));
        shared.done.cancel();
        return PlaySession { shared };
    }

    // Subscribe before anything is staged so no digit or hangup can slip
    // through while the supervisor task is still being scheduled.
    let channel_events = player.subscribe(&[
        EventKind::ChannelDtmfReceived,
        EventKind::ChannelHangupRequest,
        EventKind::ChannelDestroyed,
    ]);

    info!(
        session_id = %shared.id,
        uris = shared.queue.len(),
        replays = options.replays,
        collect_digits = shared.match_fn.is_some(),
        "play session starting"
    );

    tokio::spawn(supervise(
        shared.clone(),
        player,
        options,
        channel_events,
        digit_rx,
    ));

    PlaySession { shared }
}

/// Handle to a running (or finished) playback session.
#[derive(Clone)]
pub struct PlaySession {
    shared: Arc<SessionShared>,
}

impl PlaySession {
    /// Unique session id, as used in this crate's log output.
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    /// Append a media URI to the queue. Safe at any time; URIs appended
    /// behind the cursor are picked up by the pass in flight.
    pub fn add(&self, uri: impl Into<MediaUri>) {
        self.shared.queue.add(uri);
    }

    /// Append several media URIs to the queue.
    pub fn add_all<I, S>(&self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<MediaUri>,
    {
        self.shared.queue.add_all(uris);
    }

    /// Stop the audio currently playing without ending the session: the
    /// digit wait and any remaining replays still run.
    pub fn stop_audio(&self) {
        debug!(session_id = %self.shared.id, "stop audio requested");
        self.shared.stop_current_sequence();
    }

    /// Stop the whole session. Idempotent; a session that already reached a
    /// terminal status keeps it.
    pub fn stop(&self) {
        debug!(session_id = %self.shared.id, "stop requested");
        self.shared.root.cancel();
    }

    /// Completes once the session has fully unwound: audio stopped, all
    /// subscriptions released, result frozen.
    pub async fn done(&self) {
        self.shared.done.cancelled().await;
    }

    pub fn is_done(&self) -> bool {
        self.shared.done.is_cancelled()
    }

    /// Wait for the session to end and return the final snapshot.
    pub async fn result(&self) -> PlayResult {
        self.done().await;
        self.shared.snapshot()
    }

    /// Wait for the session to end and return the error it finished with,
    /// if any.
    pub async fn err(&self) -> Option<Arc<PlayError>> {
        self.done().await;
        self.shared.snapshot().error
    }
}

/// State shared between the session handle, the supervisor, the DTMF
/// listener, and the digit wait.
pub(crate) struct SessionShared {
    pub(crate) id: String,
    /// Session-wide cancellation; a child of the caller's token if one was
    /// configured.
    pub(crate) root: CancellationToken,
    done: CancellationToken,
    pub(crate) queue: AudioQueue,
    pub(crate) match_fn: Option<MatchFn>,
    digit_tx: mpsc::Sender<()>,
    state: Mutex<SessionState>,
}

struct SessionState {
    dtmf: String,
    digits_received: usize,
    match_result: MatchResult,
    status: Status,
    error: Option<Arc<PlayError>>,
    duration: Duration,
    current: Option<Arc<Sequence>>,
}

impl SessionShared {
    fn new(options: &PlayOptions, digit_tx: mpsc::Sender<()>) -> Arc<Self> {
        let parent = options.cancel_token.clone().unwrap_or_default();
        Arc::new(Self {
            id: format!("ps:{}", Uuid::new_v4()),
            root: parent.child_token(),
            done: CancellationToken::new(),
            queue: AudioQueue::new(options.uris.clone()),
            match_fn: options.match_fn.clone(),
            digit_tx,
            state: Mutex::new(SessionState {
                dtmf: String::new(),
                digits_received: 0,
                match_result: MatchResult::Incomplete,
                status: Status::InProgress,
                error: None,
                duration: Duration::ZERO,
                current: None,
            }),
        })
    }

    /// Assign the terminal status. First assignment wins; later calls are
    /// no-ops so racing clocks and listeners cannot overwrite each other.
    pub(crate) fn finish(&self, status: Status, error: Option<PlayError>) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.status.is_terminal() {
            return false;
        }
        state.status = status;
        state.error = error.map(Arc::new);
        true
    }

    pub(crate) fn on_digit(&self, digit: char) {
        {
            let mut state = self.state.lock().unwrap();
            // A digit racing the end of the session must not extend a
            // result that already matched.
            if state.status.is_terminal() {
                return;
            }
            state.dtmf.push(digit);
            state.digits_received += 1;
        }
        debug!(session_id = %self.id, %digit, "dtmf received");
        // Coalescing wake-up: a full channel means a signal is already
        // pending, so this one is dropped while the digit itself is kept.
        let _ = self.digit_tx.try_send(());
        if self.match_fn.is_some() {
            self.stop_current_sequence();
        }
    }

    /// Run the match function over the collected digits, storing both the
    /// rewritten string and the verdict. A complete match turns the session
    /// terminal under the same lock, so no concurrent digit can extend the
    /// string it matched.
    pub(crate) fn apply_match(&self, match_fn: &MatchFn) -> MatchResult {
        let mut state = self.state.lock().unwrap();
        let (dtmf, result) = match_fn(&state.dtmf);
        state.dtmf = dtmf;
        state.match_result = result;
        if result == MatchResult::Complete && !state.status.is_terminal() {
            state.status = Status::Finished;
        }
        drop(state);
        debug!(session_id = %self.id, result = %result, "match function applied");
        result
    }

    pub(crate) fn stop_current_sequence(&self) {
        let current = self.state.lock().unwrap().current.clone();
        if let Some(seq) = current {
            seq.stop();
        }
    }

    fn set_current(&self, seq: Option<Arc<Sequence>>) {
        self.state.lock().unwrap().current = seq;
    }

    fn reset_for_pass(&self) {
        let mut state = self.state.lock().unwrap();
        state.dtmf.clear();
        state.match_result = MatchResult::Incomplete;
    }

    fn set_duration(&self, duration: Duration) {
        self.state.lock().unwrap().duration = duration;
    }

    fn snapshot(&self) -> PlayResult {
        let state = self.state.lock().unwrap();
        PlayResult {
            duration: state.duration,
            dtmf: state.dtmf.clone(),
            digits_received: state.digits_received,
            match_result: state.match_result,
            status: state.status,
            error: state.error.clone(),
        }
    }
}

async fn supervise(
    shared: Arc<SessionShared>,
    player: Arc<dyn Player>,
    options: PlayOptions,
    channel_events: Box<dyn Subscription>,
    mut digit_rx: mpsc::Receiver<()>,
) {
    let started_at = Instant::now();

    let listener = tokio::spawn(dtmf::listen(shared.clone(), channel_events));
    let watchdog = tokio::spawn(playback_watchdog(
        shared.clone(),
        options.max_playback_time,
    ));

    run_passes(&shared, player.as_ref(), &options, &mut digit_rx).await;

    // Exactly one terminal status survives. All of these are no-ops when a
    // listener, a clock, or a completed match got there first.
    if shared.root.is_cancelled() {
        shared.finish(Status::Cancelled, Some(PlayError::Cancelled));
    } else if shared.match_fn.is_some() {
        shared.finish(Status::Timeout, None);
    } else {
        shared.finish(Status::Finished, None);
    }

    shared.root.cancel();
    join_all([listener, watchdog]).await;

    shared.set_duration(started_at.elapsed());
    let result = shared.snapshot();
    info!(
        session_id = %shared.id,
        status = %result.status,
        dtmf = %result.dtmf,
        duration_ms = result.duration.as_millis() as u64,
        "play session finished"
    );
    shared.done.cancel();
}

/// The replay loop: one queue pass plus one digit wait per attempt.
async fn run_passes(
    shared: &Arc<SessionShared>,
    player: &dyn Player,
    options: &PlayOptions,
    digit_rx: &mut mpsc::Receiver<()>,
) {
    for pass in 0..=options.replays {
        if shared.root.is_cancelled() {
            return;
        }
        // A wake-up queued by a digit from an earlier pass must not shrink
        // the new first-digit window; drain it before clearing the digits
        // it signalled.
        drain_digit_signals(digit_rx);
        shared.reset_for_pass();

        let seq = Sequence::new(&shared.root);
        shared.set_current(Some(seq.clone()));
        let outcome = seq
            .run(player, &shared.queue, options.playback_start_timeout)
            .await;
        shared.set_current(None);
        debug!(session_id = %shared.id, pass, status = %outcome.status, "queue pass ended");

        match outcome.status {
            Status::Finished => {}
            // A cancelled pass under a live session is stop-audio or
            // barge-in; the digit wait still runs.
            Status::Cancelled => {
                if shared.root.is_cancelled() {
                    return;
                }
            }
            _ => {
                shared.finish(outcome.status, outcome.error);
                shared.root.cancel();
                return;
            }
        }

        let match_fn = match shared.match_fn.as_ref() {
            // No digit wait without a match function; passes run
            // back-to-back until the replays are used up.
            None => continue,
            Some(f) => f,
        };

        let waited = wait::wait_digits(
            shared,
            digit_rx,
            match_fn,
            options.first_digit_timeout,
            options.inter_digit_timeout,
            options.overall_digit_timeout,
        )
        .await;
        match waited {
            WaitOutcome::Matched => {
                // apply_match already froze the result as Finished.
                shared.root.cancel();
                return;
            }
            WaitOutcome::Cancelled => return,
            // Invalid and expired waits replay while budget remains.
            WaitOutcome::Invalid | WaitOutcome::TimedOut => {}
        }
    }
}

fn drain_digit_signals(digit_rx: &mut mpsc::Receiver<()>) {
    while digit_rx.try_recv().is_ok() {}
}

async fn playback_watchdog(shared: Arc<SessionShared>, max_playback_time: Duration) {
    tokio::select! {
        _ = shared.root.cancelled() => {}
        _ = tokio::time::sleep(max_playback_time) => {
            warn!(session_id = %shared.id, ?max_playback_time, "maximum playback time exceeded");
            shared.finish(Status::Timeout, Some(PlayError::MaxPlaybackTime));
            shared.root.cancel();
        }
    }
}
