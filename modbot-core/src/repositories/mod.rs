// src/repositories/mod.rs
//
// Relational persistence lives outside this crate; the in-memory stores here
// implement the same repository traits and are what the server runs on.

pub mod memory;

pub use memory::{
    InMemoryFilterRepository,
    InMemoryNoteRepository,
    InMemorySettingsRepository,
    InMemoryStatsRepository,
    InMemoryViolationRepository,
};
