//! Configuration loading, provider construction, and the reloadable skill engine.

pub mod bootstrap;
pub mod config;
pub mod engine;

pub use config::Config;
pub use engine::{IngestSummary, SkillEngine};
