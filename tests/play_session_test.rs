//! Integration tests over the public API, end to end through [`MockAri`].

use rustari::play::{
    matcher, play, MatchResult, PlayOptions, Status, DEFAULT_FIRST_DIGIT_TIMEOUT,
    DEFAULT_PLAYBACK_START_TIMEOUT,
};
use rustari::player::Player;
use rustari::testing::MockAri;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_prompt_session_round_trip() {
    let _ = tracing_subscriber::fmt::try_init();

    let ari = MockAri::new();
    let session = play(
        Arc::new(ari.clone()),
        PlayOptions::prompt()
            .with_uri("sound:agent-newlocation")
            .with_match(matcher::match_len_or_terminator(4, '#'))
            .with_replays(1)
            .with_digit_timeouts(
                Duration::from_secs(2),
                Duration::from_secs(2),
                Duration::from_secs(10),
            ),
    );
    assert!(!session.is_done());

    ari.finish_next_play(500).await.expect("prompt played");
    ari.dtmf_string("1234");

    let result = session.result().await;
    assert_eq!(result.status, Status::Finished);
    assert_eq!(result.match_result, MatchResult::Complete);
    assert_eq!(result.dtmf, "1234");
    assert!(session.err().await.is_none());
    assert!(session.is_done());
}

#[tokio::test]
async fn test_pure_playback_with_add_all() {
    let _ = tracing_subscriber::fmt::try_init();

    let ari = MockAri::new();
    let session = play(
        Arc::new(ari.clone()),
        PlayOptions::new().with_uri("sound:intro"),
    );

    let p1 = ari.next_play(500).await.expect("first clip");
    session.add_all(["sound:body", "sound:outro"]);
    ari.playback_started(&p1.playback_id);
    ari.playback_finished(&p1.playback_id);

    for expected in ["sound:body", "sound:outro"] {
        let p = ari.finish_next_play(500).await.expect("appended clip");
        assert_eq!(p.uri, expected);
    }

    let result = session.result().await;
    assert_eq!(result.status, Status::Finished);
    assert_eq!(result.digits_received, 0);
    assert_eq!(ari.staged().len(), 3);
}

#[tokio::test]
async fn test_stop_during_digit_wait() {
    let _ = tracing_subscriber::fmt::try_init();

    let ari = MockAri::new();
    let session = play(
        Arc::new(ari.clone()),
        PlayOptions::prompt()
            .with_uri("sound:enter-code")
            .with_digit_timeouts(
                Duration::from_secs(5),
                Duration::from_secs(5),
                Duration::from_secs(30),
            ),
    );

    ari.finish_next_play(500).await.expect("prompt played");
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.stop();

    let result = session.result().await;
    assert_eq!(result.status, Status::Cancelled);
    let err = session.err().await.expect("cancel carries an error");
    assert_eq!(err.to_string(), "context canceled");
}

#[tokio::test]
async fn test_mock_transport_implements_player() {
    let ari = MockAri::new();

    let handle = assert_ok!(ari.stage_play("play:smoke", "sound:x").await);
    assert_eq!(handle.id(), "play:smoke");
    assert_ok!(handle.exec().await);
    assert_ok!(handle.stop().await);

    assert_eq!(ari.executed(), vec!["play:smoke".to_string()]);
    assert_eq!(ari.stopped(), vec!["play:smoke".to_string()]);
}

#[test]
fn test_default_clocks() {
    assert_eq!(DEFAULT_PLAYBACK_START_TIMEOUT, Duration::from_secs(2));
    assert_eq!(DEFAULT_FIRST_DIGIT_TIMEOUT, Duration::from_secs(4));
}
