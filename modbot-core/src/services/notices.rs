//! Fixed user-facing texts. Internal error detail never reaches chat users;
//! it goes to the log only.

pub const VIOLATION: &str = "⚠️ Message violates chat rules";
pub const ACTION_FAILED: &str = "❌ Action failed. Please try again later.";
pub const ADMIN_ONLY: &str = "❌ Admin only command in groups";
pub const GROUP_ONLY: &str = "❌ This command only works in groups";
pub const PRIVATE_ONLY: &str = "❌ This command only works in private chat";
pub const AUTO_BANNED: &str = "🚫 User auto-banned (warning limit reached)";
pub const AUTO_MUTED: &str = "🔇 User muted for repeated violations";

pub fn usage(line: &str) -> String {
    format!("❓ Usage: {}", line)
}
