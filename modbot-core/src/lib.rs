// src/lib.rs

pub mod repositories;
pub mod platforms;
pub mod services;
pub mod tasks;
pub mod http;
pub mod test_utils;

pub use modbot_common::error::Error;
pub use modbot_common::models;
