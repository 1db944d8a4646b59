//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration profiles from YAML files.

use std::fs;
use std::path::Path;

use chrono::FixedOffset;
use tracing::info;

use crate::calculation::{BreakSchedule, ResolutionPolicy};
use crate::error::{AttendanceError, EngineResult};

use super::types::{BreakConfig, EngineConfig, ProfileMetadata};

/// Loads and provides access to an engine configuration profile.
///
/// # Directory Structure
///
/// The profile directory should have the following structure:
/// ```text
/// config/jakarta/
/// ├── engine.yaml   # Timezone, shift caps, buffers, cache settings
/// └── breaks.yaml   # Standard break slots keyed by shift name
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/jakarta").unwrap();
/// println!("Profile: {}", loader.profile().name);
/// println!("Max shifts per day: {}", loader.config().max_shifts_per_day);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified profile directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the profile directory (e.g., "./config/jakarta")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The configured UTC offset is out of range
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let mut config = Self::load_yaml::<EngineConfig>(&engine_path)?;

        let breaks_path = path.join("breaks.yaml");
        config.breaks = Self::load_yaml::<BreakConfig>(&breaks_path)?;

        if config.utc_offset().is_none() {
            return Err(AttendanceError::ConfigParseError {
                path: engine_path.display().to_string(),
                message: format!("utc_offset_minutes out of range: {}", config.utc_offset_minutes),
            });
        }

        info!(
            profile = %config.profile.code,
            max_shifts_per_day = config.max_shifts_per_day,
            min_shift_gap_minutes = config.min_shift_gap_minutes,
            break_profiles = config.breaks.standard.len(),
            "Attendance engine configuration loaded"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| AttendanceError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| AttendanceError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// Returns the profile metadata.
    pub fn profile(&self) -> &ProfileMetadata {
        &self.config.profile
    }

    /// Returns the civil timezone offset.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.config.utc_offset()
    }

    /// Returns the shift resolution buffers.
    pub fn resolution_policy(&self) -> ResolutionPolicy {
        self.config.resolution_policy()
    }

    /// Builds the standard break schedule.
    pub fn break_schedule(&self) -> BreakSchedule {
        BreakSchedule::from_config(&self.config.breaks)
    }
}
