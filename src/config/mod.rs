//! Configuration loading and management for the Attendance Engine.
//!
//! This module provides functionality to load engine configuration
//! profiles from YAML files: timezone offset, daily shift caps, resolution
//! buffers, stale-session repair settings, cache sizing and standard breaks.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/jakarta").unwrap();
//! println!("Loaded profile: {}", loader.profile().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BreakConfig, BreakSlot, DEFAULT_AUTO_CLOSE_HOURS, DEFAULT_CACHE_MAX_CAPACITY,
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_MAX_SHIFTS_PER_DAY, DEFAULT_MIN_SHIFT_GAP_MINUTES,
    DEFAULT_STALE_SESSION_HOURS, DEFAULT_UTC_OFFSET_MINUTES, EngineConfig, ProfileMetadata,
};
