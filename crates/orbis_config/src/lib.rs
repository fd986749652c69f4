//! File-backed default settings for the orbis search engine.
//!
//! A settings file is TOML with optional `[returns]`, `[rise_set]`,
//! `[visibility]`, `[observer]`, `[cache]`, and `[scan]` tables. Every
//! key has a default, so an empty file is valid.

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    CacheSettings, DEFAULT_CACHE_CAPACITY, ScanSettings, Settings, VisibilitySettings,
};
