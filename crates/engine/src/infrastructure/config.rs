//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tuning for containment operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentConfig {
    /// How many times one operation re-validates after losing a commit race
    /// before reporting a transient failure
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,
}

fn default_max_commit_attempts() -> u32 {
    3
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: default_max_commit_attempts(),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON world snapshot to seed the in-memory store with
    pub seed_path: Option<PathBuf>,

    /// Containment operation tuning
    pub containment: ContainmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let max_commit_attempts = match env::var("HOLDFAST_MAX_COMMIT_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .context("HOLDFAST_MAX_COMMIT_ATTEMPTS must be a positive integer")?,
            Err(_) => default_max_commit_attempts(),
        };
        if max_commit_attempts == 0 {
            anyhow::bail!("HOLDFAST_MAX_COMMIT_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            seed_path: env::var("HOLDFAST_SEED_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            containment: ContainmentConfig {
                max_commit_attempts,
            },
        })
    }
}
