// tests/escalation_tests.rs

use std::sync::Arc;
use chrono::{Duration, Utc};

use modbot_common::models::{ChatSettings, Escalation, EscalationState, StatKind};
use modbot_common::traits::{ChatPlatform, MockChatPlatform, SettingsRepository, StatsRepository};
use modbot_core::Error;
use modbot_core::services::EventContext;
use modbot_core::services::notices;
use modbot_core::test_utils::RecordingPlatform;

async fn context_with(platform: Arc<dyn ChatPlatform>, settings: Option<ChatSettings>) -> Result<EventContext, Error> {
    let ctx = EventContext::in_memory(platform);
    if let Some(settings) = settings {
        ctx.settings_repo.save_settings(&settings).await?;
    }
    Ok(ctx)
}

fn settings(chat_id: i64, ban_after: Option<u32>, mute_minutes: Option<u32>) -> ChatSettings {
    let mut s = ChatSettings::for_chat(chat_id);
    s.auto_ban_enabled = ban_after.is_some();
    s.auto_ban_after_warnings = ban_after.unwrap_or(3);
    s.auto_mute_enabled = mute_minutes.is_some();
    s.auto_mute_duration = mute_minutes.unwrap_or(60);
    s
}

#[tokio::test]
async fn test_sequential_violations_count_exactly() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform.clone(), Some(settings(1, Some(10), None))).await?;

    for n in 1..=9u32 {
        let outcome = ctx.escalation.record_violation(1, 42).await?;
        assert_eq!(outcome.record.warning_count, n);
        assert_eq!(outcome.escalation, Escalation::Warned);
    }
    let record = ctx.escalation.record(1, 42).await?;
    assert_eq!(record.state(), EscalationState::Warned(9));
    assert!(platform.bans().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_third_violation_bans_exactly_once() -> Result<(), Error> {
    let mut mock = MockChatPlatform::new();
    mock.expect_ban_user()
        .withf(|chat, user| *chat == 100 && *user == 7)
        .times(1)
        .returning(|_, _| Ok(true));
    mock.expect_send_message().returning(|_, _| Ok(()));

    // No stored settings: global defaults (threshold 3, auto-ban on) apply.
    let ctx = context_with(Arc::new(mock), None).await?;

    let first = ctx.escalation.record_violation(100, 7).await?;
    let second = ctx.escalation.record_violation(100, 7).await?;
    let third = ctx.escalation.record_violation(100, 7).await?;
    let fourth = ctx.escalation.record_violation(100, 7).await?;

    assert_eq!(first.escalation, Escalation::Warned);
    assert_eq!(second.escalation, Escalation::Warned);
    assert_eq!(third.escalation, Escalation::Banned);
    assert_eq!(third.threshold, 3);
    assert_eq!(fourth.escalation, Escalation::AlreadyBanned);

    let record = ctx.escalation.record(100, 7).await?;
    assert!(record.banned);
    assert_eq!(record.warning_count, 3);
    assert_eq!(ctx.stats_repo.get_stats(100).await?.get(StatKind::Bans), 1);
    Ok(())
}

#[tokio::test]
async fn test_mute_window_and_sweep() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform.clone(), Some(settings(5, None, Some(10)))).await?;
    let now = Utc::now();

    let outcome = ctx.escalation.record_violation_at(5, 9, now).await?;
    assert_eq!(outcome.escalation, Escalation::Muted { until: now + Duration::minutes(10) });
    assert!(platform.sent_texts(5).contains(&notices::AUTO_MUTED.to_string()));

    let lifted = ctx.escalation.sweep_expired_mutes_at(5, now + Duration::minutes(5)).await?;
    assert!(lifted.is_empty());
    assert!(ctx.escalation.record(5, 9).await?.muted);

    let lifted = ctx.escalation.sweep_expired_mutes_at(5, now + Duration::minutes(11)).await?;
    assert_eq!(lifted, vec![9]);
    let record = ctx.escalation.record(5, 9).await?;
    assert!(!record.muted);
    assert_eq!(record.muted_until, None);
    assert_eq!(record.warning_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_newer_violation_extends_mute_past_sweep() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform, Some(settings(5, None, Some(10)))).await?;
    let start = Utc::now();

    ctx.escalation.record_violation_at(5, 9, start).await?;
    // Second violation eight minutes later restarts the window.
    ctx.escalation.record_violation_at(5, 9, start + Duration::minutes(8)).await?;

    let lifted = ctx.escalation.sweep_expired_mutes_at(5, start + Duration::minutes(11)).await?;
    assert!(lifted.is_empty());
    let record = ctx.escalation.record(5, 9).await?;
    assert!(record.muted);
    assert_eq!(record.warning_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_sweep_all_covers_every_chat() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform, Some(settings(1, None, Some(1)))).await?;
    ctx.settings_repo.save_settings(&settings(2, None, Some(1))).await?;
    let now = Utc::now();

    ctx.escalation.record_violation_at(1, 10, now).await?;
    ctx.escalation.record_violation_at(2, 20, now).await?;

    let lifted = ctx.escalation.sweep_all_expired_mutes_at(now + Duration::minutes(2)).await?;
    assert_eq!(lifted, 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_violations_lose_no_updates() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform, Some(settings(3, None, None))).await?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let escalation = ctx.escalation.clone();
        handles.push(tokio::spawn(async move { escalation.record_violation(3, 77).await }));
    }
    for handle in handles {
        handle.await.expect("task panicked")?;
    }

    assert_eq!(ctx.escalation.record(3, 77).await?.warning_count, 16);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_violations_at_threshold_ban_once() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform.clone(), None).await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let escalation = ctx.escalation.clone();
        handles.push(tokio::spawn(async move { escalation.record_violation(4, 5).await }));
    }
    for handle in handles {
        handle.await.expect("task panicked")?;
    }

    let record = ctx.escalation.record(4, 5).await?;
    assert!(record.banned);
    assert_eq!(record.warning_count, 3);
    assert_eq!(platform.bans(), vec![(4, 5)]);
    Ok(())
}

#[tokio::test]
async fn test_clear_is_idempotent_and_unbans() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform, None).await?;

    for _ in 0..3 {
        ctx.escalation.record_violation(8, 1).await?;
    }
    assert!(ctx.escalation.record(8, 1).await?.banned);

    let cleared = ctx.escalation.clear(8, 1).await?;
    assert_eq!(cleared.state(), EscalationState::Clean);
    let again = ctx.escalation.clear(8, 1).await?;
    assert_eq!(again.state(), EscalationState::Clean);
    assert_eq!(again.version, cleared.version);

    // Never-seen user clears fine as well.
    let fresh = tokio_test::assert_ok!(ctx.escalation.clear(8, 999).await);
    assert_eq!(fresh.warning_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_banned_user_cannot_be_muted() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = context_with(platform, Some(settings(6, Some(1), Some(10)))).await?;

    let outcome = ctx.escalation.record_violation(6, 2).await?;
    assert_eq!(outcome.escalation, Escalation::Banned);
    assert!(!outcome.record.muted);

    let muted = ctx.escalation.mute_until(6, 2, Utc::now() + Duration::hours(1)).await?;
    assert!(muted.is_none());
    assert!(!ctx.escalation.record(6, 2).await?.muted);
    Ok(())
}

#[tokio::test]
async fn test_failed_ban_call_is_reported_to_chat() -> Result<(), Error> {
    let platform = Arc::new(RecordingPlatform::new());
    platform.set_fail_actions(true);
    let ctx = context_with(platform.clone(), Some(settings(9, Some(1), None))).await?;

    let outcome = ctx.escalation.record_violation(9, 3).await?;
    assert_eq!(outcome.escalation, Escalation::Banned);
    assert!(platform.sent_texts(9).contains(&notices::ACTION_FAILED.to_string()));
    assert_eq!(ctx.stats_repo.get_stats(9).await?.get(StatKind::Bans), 0);
    Ok(())
}
