//! Channel-event listener: digit accumulation, barge-in, hangup.

use super::result::Status;
use super::session::SessionShared;
use crate::event::Event;
use crate::player::Subscription;
use std::sync::Arc;
use tracing::info;

/// Consume channel events for the whole session lifetime.
///
/// Digits are pushed into the session state and coalesced into the digit
/// signal channel; any digit barges in on running audio when a match
/// function is configured. Hangup is first-class: it finishes the session
/// with [`Status::Hangup`] and tears everything down.
pub(crate) async fn listen(shared: Arc<SessionShared>, mut events: Box<dyn Subscription>) {
    loop {
        tokio::select! {
            _ = shared.root.cancelled() => break,
            ev = events.recv() => match ev {
                Some(Event::ChannelDtmfReceived { digit, .. }) => shared.on_digit(digit),
                Some(Event::ChannelHangupRequest) | Some(Event::ChannelDestroyed) => {
                    info!(session_id = %shared.id, "channel hung up");
                    shared.finish(Status::Hangup, None);
                    shared.root.cancel();
                    break;
                }
                Some(_) => {}
                // Subscription teardown is not a session outcome; park until
                // the session itself winds down.
                None => {
                    shared.root.cancelled().await;
                    break;
                }
            },
        }
    }
    events.cancel();
}
