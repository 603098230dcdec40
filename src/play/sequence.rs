//! One pass over the audio queue.

use super::clip::{self, ClipOutcome};
use super::queue::AudioQueue;
use super::result::Status;
use crate::player::Player;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// A single front-to-back walk of the queue.
///
/// Each replay gets a fresh `Sequence`, so stopping one (barge-in, a
/// caller's stop-audio) never bleeds into the next pass. `done` latches
/// exactly once, when the pass has fully unwound, and is safe to await from
/// any task.
pub(crate) struct Sequence {
    cancel: CancellationToken,
    done: CancellationToken,
}

impl Sequence {
    pub(crate) fn new(parent: &CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            cancel: parent.child_token(),
            done: CancellationToken::new(),
        })
    }

    /// Stop this pass only. Digit-wait and replay logic keep running.
    pub(crate) fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait until the pass has fully unwound. The controller consumes the
    /// latch through `run` itself; only tests observe it from outside.
    #[cfg(test)]
    pub(crate) async fn done(&self) {
        self.done.cancelled().await;
    }

    #[cfg(test)]
    pub(crate) fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Play the queue front to back, stopping at the first clip that does
    /// not finish cleanly.
    pub(crate) async fn run(
        &self,
        player: &dyn Player,
        queue: &AudioQueue,
        start_timeout: Duration,
    ) -> ClipOutcome {
        let outcome = self.run_clips(player, queue, start_timeout).await;
        self.done.cancel();
        outcome
    }

    async fn run_clips(
        &self,
        player: &dyn Player,
        queue: &AudioQueue,
        start_timeout: Duration,
    ) -> ClipOutcome {
        let mut next = queue.first();
        while let Some(uri) = next {
            if uri.is_empty() {
                next = queue.next();
                continue;
            }
            if self.cancel.is_cancelled() {
                return ClipOutcome {
                    status: Status::Cancelled,
                    error: None,
                };
            }

            let playback_id = format!("play:{}", Uuid::new_v4());
            debug!(playback_id = %playback_id, uri = %uri, "starting clip");
            let outcome =
                clip::play_clip(&self.cancel, player, &playback_id, &uri, start_timeout).await;
            if outcome.status != Status::Finished {
                return outcome;
            }

            next = queue.next();
        }
        ClipOutcome {
            status: Status::Finished,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAri;

    #[tokio::test]
    async fn test_plays_whole_queue_once() {
        let ari = MockAri::new();
        let root = CancellationToken::new();
        let queue = Arc::new(AudioQueue::new(vec![
            "sound:one".to_string(),
            "sound:two".to_string(),
        ]));
        let seq = Sequence::new(&root);

        let pass = tokio::spawn({
            let seq = seq.clone();
            let ari = ari.clone();
            let queue = queue.clone();
            async move { seq.run(&ari, &queue, Duration::from_millis(200)).await }
        });

        for expected in ["sound:one", "sound:two"] {
            let play = ari.next_play(200).await.expect("clip staged");
            assert_eq!(play.uri, expected);
            ari.playback_started(&play.playback_id);
            ari.playback_finished(&play.playback_id);
        }

        let outcome = pass.await.unwrap();
        assert_eq!(outcome.status, Status::Finished);
        assert!(seq.is_done());
        seq.done().await;
        assert_eq!(ari.staged().len(), 2);
    }

    #[tokio::test]
    async fn test_skips_empty_uris() {
        let ari = MockAri::new();
        let root = CancellationToken::new();
        let queue = Arc::new(AudioQueue::new(vec![
            String::new(),
            "sound:only".to_string(),
            String::new(),
        ]));
        let seq = Sequence::new(&root);

        let pass = tokio::spawn({
            let seq = seq.clone();
            let ari = ari.clone();
            let queue = queue.clone();
            async move { seq.run(&ari, &queue, Duration::from_millis(200)).await }
        });

        let play = ari.next_play(200).await.expect("clip staged");
        assert_eq!(play.uri, "sound:only");
        ari.playback_started(&play.playback_id);
        ari.playback_finished(&play.playback_id);

        let outcome = pass.await.unwrap();
        assert_eq!(outcome.status, Status::Finished);
        assert_eq!(ari.staged().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_ends_pass_without_later_clips() {
        let ari = MockAri::new();
        let root = CancellationToken::new();
        let queue = Arc::new(AudioQueue::new(vec![
            "sound:one".to_string(),
            "sound:two".to_string(),
        ]));
        let seq = Sequence::new(&root);

        let pass = tokio::spawn({
            let seq = seq.clone();
            let ari = ari.clone();
            let queue = queue.clone();
            async move { seq.run(&ari, &queue, Duration::from_millis(200)).await }
        });

        let play = ari.next_play(200).await.expect("clip staged");
        ari.playback_started(&play.playback_id);
        seq.stop();

        let outcome = pass.await.unwrap();
        assert_eq!(outcome.status, Status::Cancelled);
        assert!(outcome.error.is_none());
        assert!(seq.is_done());
        // The second URI was never staged.
        assert_eq!(ari.staged().len(), 1);
    }
}
