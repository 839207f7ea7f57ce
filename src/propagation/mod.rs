// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact geodesic propagation and best-source queries

mod engine;
mod query;
mod queue;
mod window;

pub use engine::GeodesicAlgorithmExact;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance reported for points the wavefront never reached
pub const GEODESIC_INF: f64 = f64::INFINITY;

/// When a run with stop points may end before the distance limit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    /// Stop as soon as every stop point has its final distance
    #[default]
    EarlyExit,
    /// Ignore stop points and run the queue down to the limit
    ExhaustLimit,
}

impl FromStr for StopPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "early-exit" | "early" => Ok(Self::EarlyExit),
            "exhaust-limit" | "exhaust" => Ok(Self::ExhaustLimit),
            other => Err(format!(
                "unknown stop policy '{}' (expected early-exit or exhaust-limit)",
                other
            )),
        }
    }
}

impl fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EarlyExit => write!(f, "early-exit"),
            Self::ExhaustLimit => write!(f, "exhaust-limit"),
        }
    }
}

/// Counters collected during one propagation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropagationStats {
    pub windows_created: usize,
    pub events_processed: usize,
    pub max_queue_len: usize,
    pub vertices_reached: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_policy_parsing() {
        assert_eq!("early-exit".parse::<StopPolicy>(), Ok(StopPolicy::EarlyExit));
        assert_eq!("EXHAUST_LIMIT".parse::<StopPolicy>(), Ok(StopPolicy::ExhaustLimit));
        assert!("sometimes".parse::<StopPolicy>().is_err());
        assert_eq!(StopPolicy::ExhaustLimit.to_string(), "exhaust-limit");
        assert_eq!(StopPolicy::default(), StopPolicy::EarlyExit);
    }
}
