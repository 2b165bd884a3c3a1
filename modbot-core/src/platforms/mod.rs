// File: src/platforms/mod.rs

pub mod telegram;

pub use modbot_common::traits::ChatPlatform;
