//! Wire events delivered by the ARI transport.
//!
//! Only the events the playback engine consumes are modeled here. The JSON
//! shape follows the ARI convention: a PascalCase `type` tag plus snake_case
//! fields, so a gateway can deserialize frames straight off the websocket.

use serde::{Deserialize, Serialize};

/// An ARI event relevant to a playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A staged playback has actually begun emitting audio.
    PlaybackStarted { playback_id: String },
    /// A playback has finished, either naturally or because it was stopped.
    PlaybackFinished { playback_id: String },
    /// The far end pressed a DTMF key.
    ChannelDtmfReceived { digit: char, duration_ms: u64 },
    /// The far end asked to hang up.
    ChannelHangupRequest,
    /// The channel is gone entirely.
    ChannelDestroyed,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PlaybackStarted { .. } => EventKind::PlaybackStarted,
            Event::PlaybackFinished { .. } => EventKind::PlaybackFinished,
            Event::ChannelDtmfReceived { .. } => EventKind::ChannelDtmfReceived,
            Event::ChannelHangupRequest => EventKind::ChannelHangupRequest,
            Event::ChannelDestroyed => EventKind::ChannelDestroyed,
        }
    }

    /// The playback this event is scoped to, if any.
    pub fn playback_id(&self) -> Option<&str> {
        match self {
            Event::PlaybackStarted { playback_id } => Some(playback_id),
            Event::PlaybackFinished { playback_id } => Some(playback_id),
            _ => None,
        }
    }
}

/// Event discriminant used when subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PlaybackStarted,
    PlaybackFinished,
    ChannelDtmfReceived,
    ChannelHangupRequest,
    ChannelDestroyed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_mapping() {
        let ev = Event::PlaybackStarted {
            playback_id: "play:1".to_string(),
        };
        assert_eq!(ev.kind(), EventKind::PlaybackStarted);
        assert_eq!(ev.playback_id(), Some("play:1"));

        assert_eq!(Event::ChannelHangupRequest.kind(), EventKind::ChannelHangupRequest);
        assert_eq!(Event::ChannelHangupRequest.playback_id(), None);
    }

    #[test]
    fn test_event_wire_shape() {
        let ev = Event::ChannelDtmfReceived {
            digit: '2',
            duration_ms: 120,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "ChannelDtmfReceived",
                "digit": "2",
                "duration_ms": 120,
            })
        );

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_unit_event_wire_shape() {
        let json = serde_json::to_string(&Event::ChannelHangupRequest).unwrap();
        assert_eq!(json, r#"{"type":"ChannelHangupRequest"}"#);
    }
}
