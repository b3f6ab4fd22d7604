//! Configuration for the planner front ends
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (LEAVE_PLANNER_*)
//! 3. Config file (~/.config/leave-planner/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::LeaveCalendar;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub first_caregiver: String,
    pub second_caregiver: String,
    /// Where the "last plan" is saved and restored from.
    pub plan_path: Option<PathBuf>,
    pub working_days: Vec<Weekday>,
    pub http_addr: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            first_caregiver: "Mother".to_string(),
            second_caregiver: "Father".to_string(),
            plan_path: None,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            http_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load from the default config file location, falling back to defaults
    /// when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        if config.working_days.is_empty() {
            return Err(ConfigError::Invalid(
                "working_days must name at least one weekday".to_string(),
            ));
        }
        Ok(config)
    }

    /// `~/.config/leave-planner/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("leave-planner").join("config.toml"))
    }

    pub fn default_plan_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("leave-planner").join("last_plan.json"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - LEAVE_PLANNER_FIRST_CAREGIVER
    /// - LEAVE_PLANNER_SECOND_CAREGIVER
    /// - LEAVE_PLANNER_PLAN_PATH
    /// - LEAVE_PLANNER_HTTP_ADDR
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("LEAVE_PLANNER_FIRST_CAREGIVER") {
            self.first_caregiver = name;
        }
        if let Some(name) = lookup("LEAVE_PLANNER_SECOND_CAREGIVER") {
            self.second_caregiver = name;
        }
        if let Some(path) = lookup("LEAVE_PLANNER_PLAN_PATH") {
            self.plan_path = Some(PathBuf::from(path));
        }
        if let Some(addr) = lookup("LEAVE_PLANNER_HTTP_ADDR") {
            self.http_addr = addr;
        }
        self
    }

    /// Configured plan file, or the per-user default.
    pub fn resolved_plan_path(&self) -> Option<PathBuf> {
        self.plan_path.clone().or_else(Self::default_plan_path)
    }

    pub fn leave_calendar(&self) -> LeaveCalendar {
        let mut calendar = LeaveCalendar::default();
        calendar.set_working_days(&self.working_days);
        calendar
    }
}
