pub mod settings;
pub mod violations;
pub mod filters;
pub mod notes;
pub mod stats;

pub use settings::InMemorySettingsRepository;
pub use violations::InMemoryViolationRepository;
pub use filters::InMemoryFilterRepository;
pub use notes::InMemoryNoteRepository;
pub use stats::InMemoryStatsRepository;
