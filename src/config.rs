// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runtime configuration: `gdist.toml` plus environment overrides

use crate::propagation::{StopPolicy, GEODESIC_INF};
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "gdist.toml";

/// Propagation and matrix settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GdistConfig {
    /// Maximum propagation distance; unset means unlimited
    pub distance_limit: Option<f64>,
    /// Worker threads for the matrix builder; unset lets rayon decide
    pub threads: Option<usize>,
    /// Early termination policy for target queries
    pub stop_policy: StopPolicy,
    /// Build matrix rows in parallel
    pub parallel_matrix: bool,
    /// Pretty-print JSON output
    pub pretty_json: bool,
}

impl Default for GdistConfig {
    fn default() -> Self {
        Self {
            distance_limit: None,
            threads: None,
            stop_policy: StopPolicy::EarlyExit,
            parallel_matrix: true,
            pretty_json: true,
        }
    }
}

impl GdistConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: GdistConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `gdist.toml` from the working directory (or defaults) with
    /// environment variable overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`GdistConfig::load`] with an explicit file, which must exist
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `GDIST_*` overrides from `lookup`; unparsable values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(limit) = lookup("GDIST_DISTANCE_LIMIT") {
            match limit.trim().parse::<f64>() {
                Ok(value) if value.is_infinite() => self.distance_limit = None,
                Ok(value) if value >= 0.0 => self.distance_limit = Some(value),
                _ => warn!("Ignoring GDIST_DISTANCE_LIMIT={:?}", limit),
            }
        }

        if let Some(threads) = lookup("GDIST_THREADS") {
            match threads.trim().parse::<usize>() {
                Ok(0) => self.threads = None,
                Ok(n) => self.threads = Some(n),
                Err(_) => warn!("Ignoring GDIST_THREADS={:?}", threads),
            }
        }

        if let Some(policy) = lookup("GDIST_STOP_POLICY") {
            match policy.parse::<StopPolicy>() {
                Ok(policy) => self.stop_policy = policy,
                Err(e) => warn!("Ignoring GDIST_STOP_POLICY: {}", e),
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Distance limit as passed to the engine
    pub fn effective_limit(&self) -> f64 {
        self.distance_limit.unwrap_or(GEODESIC_INF)
    }
}
