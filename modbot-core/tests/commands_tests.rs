// tests/commands_tests.rs

use std::sync::Arc;

use modbot_common::models::StatKind;
use modbot_common::traits::{FilterRepository, NoteRepository, StatsRepository};
use modbot_core::Error;
use modbot_core::services::commands::builtin_registry;
use modbot_core::services::notices;
use modbot_core::services::{EventContext, IngestionConfig, IngestionPipeline};
use modbot_core::test_utils::{group_reply_update, group_update, RecordingPlatform};

const CHAT: i64 = -500;
const ADMIN: i64 = 1;

struct Harness {
    platform: Arc<RecordingPlatform>,
    pipeline: IngestionPipeline,
    next_id: std::sync::atomic::AtomicI64,
}

impl Harness {
    fn new() -> Result<Self, Error> {
        let platform = Arc::new(RecordingPlatform::new());
        platform.add_admin(CHAT, ADMIN);
        let ctx = EventContext::in_memory(platform.clone());
        let pipeline = IngestionPipeline::new(ctx, Arc::new(builtin_registry()?), IngestionConfig::default());
        Ok(Self {
            platform,
            pipeline,
            next_id: std::sync::atomic::AtomicI64::new(1000),
        })
    }

    fn ctx(&self) -> &EventContext {
        self.pipeline.context()
    }

    async fn admin_says(&self, text: &str) {
        let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.pipeline.ingest(&group_update(CHAT, ADMIN, id, text)).await;
    }

    fn last_reply(&self) -> String {
        self.platform.sent_texts(CHAT).pop().unwrap_or_default()
    }
}

#[tokio::test]
async fn test_ban_kick_unban() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/ban 7 flooding").await;
    assert_eq!(h.platform.bans(), vec![(CHAT, 7)]);
    assert_eq!(h.last_reply(), "🔨 User 7 banned (reason: flooding)");

    h.admin_says("/kick 8").await;
    assert_eq!(h.platform.kicks(), vec![(CHAT, 8)]);

    h.ctx().escalation.record_violation(CHAT, 7).await?;
    h.admin_says("/unban 7").await;
    assert_eq!(h.platform.unbans(), vec![(CHAT, 7)]);
    assert_eq!(h.ctx().escalation.record(CHAT, 7).await?.warning_count, 0);

    let stats = h.ctx().stats_repo.get_stats(CHAT).await?;
    assert_eq!(stats.get(StatKind::Bans), 1);
    assert_eq!(stats.get(StatKind::Kicks), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_ban_shows_generic_notice() -> Result<(), Error> {
    let h = Harness::new()?;
    h.platform.set_fail_actions(true);

    h.admin_says("/ban 7").await;
    assert_eq!(h.last_reply(), notices::ACTION_FAILED);
    assert_eq!(h.ctx().stats_repo.get_stats(CHAT).await?.get(StatKind::Bans), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_target_shows_usage() -> Result<(), Error> {
    let h = Harness::new()?;
    h.admin_says("/ban @someone").await;
    assert!(h.last_reply().starts_with("❓ Usage: /ban"));
    assert!(h.platform.bans().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mute_and_unmute() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/mute 7 2h").await;
    assert_eq!(h.last_reply(), "🔇 User 7 muted for 2h");
    let record = h.ctx().escalation.record(CHAT, 7).await?;
    assert!(record.muted);
    assert_eq!(record.warning_count, 0);

    h.admin_says("/mute 7 forever").await;
    assert!(h.last_reply().starts_with("❓ Usage: /mute"));

    h.admin_says("/mute 7 99999999999999d").await;
    assert!(h.last_reply().starts_with("❓ Usage: /mute"));
    // Representable as a duration, but past the last representable instant.
    h.admin_says("/mute 7 9000000000000000s").await;
    assert!(h.last_reply().starts_with("❓ Usage: /mute"));

    h.admin_says("/unmute 7").await;
    assert_eq!(h.last_reply(), "🔊 User 7 unmuted");
    assert!(!h.ctx().escalation.record(CHAT, 7).await?.muted);

    h.admin_says("/unmute 7").await;
    assert_eq!(h.last_reply(), "User 7 is not muted");
    Ok(())
}

#[tokio::test]
async fn test_purge_deletes_preceding_messages() -> Result<(), Error> {
    let h = Harness::new()?;

    h.pipeline.ingest(&group_update(CHAT, ADMIN, 50, "/purge 3")).await;
    assert_eq!(
        h.platform.deleted(),
        vec![(CHAT, 49), (CHAT, 48), (CHAT, 47), (CHAT, 50)]
    );
    assert_eq!(h.last_reply(), "🗑️ Deleted 3 messages");

    h.admin_says("/purge 101").await;
    assert!(h.last_reply().starts_with("❓ Usage: /purge"));
    Ok(())
}

#[tokio::test]
async fn test_pin_requires_reply() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/pin").await;
    assert!(h.last_reply().starts_with("❓ Usage"));

    h.pipeline.ingest(&group_reply_update(CHAT, ADMIN, 70, "/pin", 7, 69)).await;
    assert_eq!(h.platform.pinned(), vec![(CHAT, 69)]);

    h.admin_says("/unpin").await;
    assert_eq!(h.platform.unpinned(), vec![(CHAT, None)]);
    Ok(())
}

#[tokio::test]
async fn test_notes_round_trip() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/note save Faq Read the pinned message first").await;
    assert_eq!(h.last_reply(), "✅ Note saved successfully");
    h.admin_says("/note get faq").await;
    assert_eq!(h.last_reply(), "📝 Read the pinned message first");
    h.admin_says("/note list").await;
    assert_eq!(h.last_reply(), "📋 Saved notes:\n• faq");
    h.admin_says("/note delete faq").await;
    assert!(h.ctx().note_repo.get_note(CHAT, "faq").await?.is_none());
    h.admin_says("/note get faq").await;
    assert_eq!(h.last_reply(), "❌ Note not found");

    assert_eq!(h.ctx().stats_repo.get_stats(CHAT).await?.get(StatKind::Notes), 1);
    Ok(())
}

#[tokio::test]
async fn test_filter_commands_drive_the_engine() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/filter add spam ****").await;
    h.admin_says("/filter addregex (oops ****").await;
    assert_eq!(h.last_reply(), "❌ Invalid pattern");
    h.admin_says(r"/filter addregex \d{4,} [number]").await;
    assert_eq!(h.ctx().filter_repo.list_filters(CHAT).await?.len(), 2);

    h.pipeline.ingest(&group_update(CHAT, 7, 1, "call 5551234 for spam")).await;
    assert_eq!(h.ctx().escalation.record(CHAT, 7).await?.warning_count, 1);

    h.admin_says("/filter remove spam").await;
    assert_eq!(h.last_reply(), "✅ Filter removed");
    h.admin_says("/filter list").await;
    assert_eq!(h.last_reply(), "📋 Active filters:\n• \\d{4,} → [number] (regex)");
    Ok(())
}

#[tokio::test]
async fn test_settings_change_escalation_policy() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/settings banthreshold 2").await;
    h.admin_says("/settings automute on").await;
    h.admin_says("/settings muteduration 5").await;
    h.admin_says("/settings colour blue").await;
    assert!(h.last_reply().starts_with("❓ Usage: /settings"));

    let first = h.ctx().escalation.record_violation(CHAT, 7).await?;
    assert!(first.record.muted);
    let second = h.ctx().escalation.record_violation(CHAT, 7).await?;
    assert!(second.record.banned);
    assert_eq!(second.threshold, 2);
    Ok(())
}

#[tokio::test]
async fn test_rules_and_help() -> Result<(), Error> {
    let h = Harness::new()?;

    h.admin_says("/rules").await;
    assert_eq!(h.last_reply(), "📋 No rules set for this chat");
    h.admin_says("/rules set Be kind. No spam.").await;
    h.pipeline.ingest(&group_update(CHAT, 7, 1, "/rules")).await;
    assert_eq!(h.last_reply(), "📋 Chat rules\n\nBe kind. No spam.");

    h.pipeline.ingest(&group_update(CHAT, 7, 2, "/help")).await;
    let help = h.last_reply();
    assert!(help.contains("/warn - "));
    assert!(help.contains("/clearwarns - "));
    Ok(())
}

#[tokio::test]
async fn test_warns_and_stats_are_open_to_members() -> Result<(), Error> {
    let h = Harness::new()?;
    h.ctx().escalation.record_violation(CHAT, 7).await?;

    h.pipeline.ingest(&group_update(CHAT, 7, 1, "/warns")).await;
    assert_eq!(h.last_reply(), "User 7 has 1/3 warnings");

    h.pipeline.ingest(&group_update(CHAT, 7, 2, "/stats")).await;
    assert!(h.last_reply().contains("⚠️ Warnings: 1"));
    Ok(())
}
