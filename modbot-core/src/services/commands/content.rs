use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use modbot_common::models::{FilterRule, Note, StatKind};

use crate::Error;
use crate::services::commands::{split_first_word, CommandContext, CommandHandler};
use crate::services::filter_engine::validate_pattern;
use crate::services::permissions::Role;

/// `/note save <key> <content> | get <key> | list | delete <key>`.
/// Reading is open to everyone; writing needs admin rights in groups.
pub struct NoteCommand;

#[async_trait]
impl CommandHandler for NoteCommand {
    fn name(&self) -> &str {
        "note"
    }

    fn description(&self) -> &str {
        "Manage chat notes: save|get|list|delete"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let (action, rest) = split_first_word(ctx.args());
        let notes = &ctx.services.note_repo;

        match action.to_lowercase().as_str() {
            "save" => {
                ctx.require(Role::GroupAdmin)?;
                let (key, content) = split_first_word(rest);
                if key.is_empty() || content.is_empty() {
                    ctx.reply_usage("/note save <key> <content>").await;
                    return Ok(());
                }
                let note = Note {
                    chat_id: ctx.chat_id(),
                    key: key.to_lowercase(),
                    content: content.to_string(),
                    updated_at: Utc::now(),
                };
                notes.save_note(&note).await?;
                ctx.bump_stat(StatKind::Notes).await;
                info!(chat_id = ctx.chat_id(), key = %note.key, "Note saved");
                ctx.reply("✅ Note saved successfully").await;
            }
            "get" => {
                let key = split_first_word(rest).0;
                if key.is_empty() {
                    ctx.reply_usage("/note get <key>").await;
                    return Ok(());
                }
                match notes.get_note(ctx.chat_id(), &key.to_lowercase()).await? {
                    Some(note) => ctx.reply(&format!("📝 {}", note.content)).await,
                    None => ctx.reply("❌ Note not found").await,
                }
            }
            "list" => {
                let all = notes.list_notes(ctx.chat_id()).await?;
                if all.is_empty() {
                    ctx.reply("📋 No notes saved yet").await;
                } else {
                    let mut text = String::from("📋 Saved notes:\n");
                    for note in all {
                        text.push_str(&format!("• {}\n", note.key));
                    }
                    ctx.reply(text.trim_end()).await;
                }
            }
            "delete" => {
                ctx.require(Role::GroupAdmin)?;
                let key = split_first_word(rest).0;
                if key.is_empty() {
                    ctx.reply_usage("/note delete <key>").await;
                    return Ok(());
                }
                if notes.delete_note(ctx.chat_id(), &key.to_lowercase()).await? {
                    ctx.reply("✅ Note deleted").await;
                } else {
                    ctx.reply("❌ Note not found").await;
                }
            }
            _ => ctx.reply_usage("/note save|get|list|delete [args]").await,
        }
        Ok(())
    }
}

/// `/filter add <pattern> <replacement> | addregex <pattern> <replacement> |
/// remove <pattern> | list`.
pub struct FilterCommand;

#[async_trait]
impl CommandHandler for FilterCommand {
    fn name(&self) -> &str {
        "filter"
    }

    fn description(&self) -> &str {
        "Manage content filters: add|addregex|remove|list"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let (action, rest) = split_first_word(ctx.args());
        let filters = &ctx.services.filter_repo;

        match action.to_lowercase().as_str() {
            action @ ("add" | "addregex") => {
                ctx.require(Role::GroupAdmin)?;
                let (pattern, replacement) = split_first_word(rest);
                if pattern.is_empty() || replacement.is_empty() {
                    ctx.reply_usage(&format!("/filter {} <pattern> <replacement>", action)).await;
                    return Ok(());
                }
                let rule = if action == "addregex" {
                    if validate_pattern(pattern).is_err() {
                        ctx.reply("❌ Invalid pattern").await;
                        return Ok(());
                    }
                    FilterRule::regex(ctx.chat_id(), pattern, replacement)
                } else {
                    FilterRule::literal(ctx.chat_id(), pattern, replacement)
                };
                filters.add_filter(&rule).await?;
                info!(chat_id = ctx.chat_id(), regex = rule.is_regex, "Filter added");
                ctx.reply("✅ Filter added").await;
            }
            "remove" => {
                ctx.require(Role::GroupAdmin)?;
                let pattern = split_first_word(rest).0;
                if pattern.is_empty() {
                    ctx.reply_usage("/filter remove <pattern>").await;
                    return Ok(());
                }
                if filters.remove_filter(ctx.chat_id(), pattern).await? {
                    ctx.reply("✅ Filter removed").await;
                } else {
                    ctx.reply("❌ No such filter").await;
                }
            }
            "list" => {
                let rules = filters.list_filters(ctx.chat_id()).await?;
                if rules.is_empty() {
                    ctx.reply("📋 No filters added yet").await;
                } else {
                    let mut text = String::from("📋 Active filters:\n");
                    for rule in rules {
                        let kind = if rule.is_regex { " (regex)" } else { "" };
                        text.push_str(&format!("• {} → {}{}\n", rule.pattern, rule.replacement, kind));
                    }
                    ctx.reply(text.trim_end()).await;
                }
            }
            _ => ctx.reply_usage("/filter add|addregex|remove|list").await,
        }
        Ok(())
    }
}
