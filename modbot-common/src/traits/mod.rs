pub mod platform_traits;
pub mod repository_traits;

pub use platform_traits::ChatPlatform;
#[cfg(feature = "mocks")]
pub use platform_traits::MockChatPlatform;
pub use repository_traits::{
    FilterRepository, NoteRepository, SettingsRepository, StatsRepository, ViolationRepository,
};
