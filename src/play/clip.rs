//! Single-clip playback: stage, subscribe, exec, then wait out the
//! started/finished handshake.

use super::result::{PlayError, Status};
use crate::event::EventKind;
use crate::player::{PlaybackHandle, Player, Subscription};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How one clip (or one whole queue pass) ended.
#[derive(Debug)]
pub(crate) struct ClipOutcome {
    pub(crate) status: Status,
    pub(crate) error: Option<PlayError>,
}

/// Play a single media URI to completion.
///
/// Subscriptions to `PlaybackStarted` and `PlaybackFinished` are opened
/// before `exec`, so a transport that starts instantly cannot emit either
/// event into the void. A finish that arrives before a start is a legal
/// fast path and counts as success.
pub(crate) async fn play_clip(
    cancel: &CancellationToken,
    player: &dyn Player,
    playback_id: &str,
    uri: &str,
    start_timeout: Duration,
) -> ClipOutcome {
    let handle = match player.stage_play(playback_id, uri).await {
        Ok(handle) => handle,
        Err(source) => {
            warn!(playback_id, uri, error = %source, "failed to stage playback");
            return ClipOutcome {
                status: Status::Failed,
                error: Some(PlayError::Stage {
                    uri: uri.to_string(),
                    source,
                }),
            };
        }
    };

    let mut started = handle.subscribe(EventKind::PlaybackStarted);
    let mut finished = handle.subscribe(EventKind::PlaybackFinished);

    let outcome = drive(
        cancel,
        handle.as_ref(),
        started.as_mut(),
        finished.as_mut(),
        uri,
        start_timeout,
    )
    .await;

    started.cancel();
    finished.cancel();
    outcome
}

async fn drive(
    cancel: &CancellationToken,
    handle: &dyn PlaybackHandle,
    started: &mut dyn Subscription,
    finished: &mut dyn Subscription,
    uri: &str,
    start_timeout: Duration,
) -> ClipOutcome {
    if let Err(source) = handle.exec().await {
        warn!(playback_id = handle.id(), uri, error = %source, "failed to start playback");
        return ClipOutcome {
            status: Status::Failed,
            error: Some(PlayError::Exec {
                uri: uri.to_string(),
                source,
            }),
        };
    }

    // The start clock only runs until PlaybackStarted; after that the
    // session-level watchdog is the sole time limit.
    let start_deadline = tokio::time::sleep(start_timeout);
    tokio::pin!(start_deadline);

    let mut started_seen = false;
    let mut started_closed = false;
    let mut finished_closed = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(playback_id = handle.id(), "clip cancelled");
                let _ = handle.stop().await;
                return ClipOutcome {
                    status: Status::Cancelled,
                    error: None,
                };
            }
            _ = &mut start_deadline, if !started_seen => {
                warn!(playback_id = handle.id(), uri, "timeout waiting for start of playback");
                let _ = handle.stop().await;
                return ClipOutcome {
                    status: Status::Timeout,
                    error: Some(PlayError::PlaybackStartTimeout),
                };
            }
            ev = finished.recv(), if !finished_closed => match ev {
                Some(_) => {
                    debug!(playback_id = handle.id(), "playback finished");
                    return ClipOutcome {
                        status: Status::Finished,
                        error: None,
                    };
                }
                // A closed subscription is not an outcome; the cancel token
                // or a timeout clock ends the clip.
                None => finished_closed = true,
            },
            ev = started.recv(), if !started_seen && !started_closed => match ev {
                Some(_) => {
                    debug!(playback_id = handle.id(), "playback started");
                    started_seen = true;
                }
                None => started_closed = true,
            },
        }
    }
}
