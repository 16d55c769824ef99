//! Planner configuration
//!
//! Loaded from JSON (every field optional) and adjustable field by field
//! through the string parameter surface shared with the solvers.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::feasibility::ProbeStrategy;
use crate::algorithm::traits::{invalid_parameter, FlowError, FlowResult};
use crate::scheduling::network::DEFAULT_MIN_TURNAROUND;

/// How the planner finds the minimum crew size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Binary search over the unit count
    #[default]
    Binary,
    /// Linear scan over the unit count
    Linear,
    /// One duty per leg, then maximum counter-flow merges duties
    CounterFlow,
}

impl SearchStrategy {
    /// Probe order for the unit-count searches; `None` for counter-flow
    pub fn probe_strategy(self) -> Option<ProbeStrategy> {
        match self {
            SearchStrategy::Binary => Some(ProbeStrategy::Binary),
            SearchStrategy::Linear => Some(ProbeStrategy::Linear),
            SearchStrategy::CounterFlow => None,
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Binary => write!(f, "binary"),
            SearchStrategy::Linear => write!(f, "linear"),
            SearchStrategy::CounterFlow => write!(f, "counter_flow"),
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(SearchStrategy::Binary),
            "linear" => Ok(SearchStrategy::Linear),
            "counter_flow" | "counter-flow" => Ok(SearchStrategy::CounterFlow),
            other => Err(invalid_parameter(
                "search",
                format!("expected binary, linear or counter_flow, got {}", other),
            )),
        }
    }
}

/// Planner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum gap between landing and the next departure of the same crew member
    pub min_turnaround: i64,
    pub search: SearchStrategy,
    /// Add the `s -> t` edge that lets surplus units skip every leg
    pub overflow_edge: bool,
    /// Skip malformed input records instead of failing
    pub skip_malformed: bool,
    /// Check bounds, conservation and chain validity after solving
    pub verify: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_turnaround: DEFAULT_MIN_TURNAROUND,
            search: SearchStrategy::Binary,
            overflow_edge: true,
            skip_malformed: false,
            verify: true,
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(json: &str) -> FlowResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> FlowResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> FlowResult<()> {
        if self.min_turnaround <= 0 {
            return Err(invalid_parameter(
                "min_turnaround",
                format!("must be positive, got {}", self.min_turnaround),
            ));
        }
        Ok(())
    }

    /// Sets one field from its string form
    pub fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()> {
        match name {
            "min_turnaround" => {
                let turnaround: i64 = value
                    .parse()
                    .map_err(|_| invalid_parameter(name, "must be an integer"))?;
                if turnaround <= 0 {
                    return Err(invalid_parameter(name, "must be positive"));
                }
                self.min_turnaround = turnaround;
            }
            "search" => self.search = value.parse()?,
            "overflow_edge" => self.overflow_edge = parse_flag(name, value)?,
            "skip_malformed" => self.skip_malformed = parse_flag(name, value)?,
            "verify" => self.verify = parse_flag(name, value)?,
            _ => return Err(invalid_parameter(name, "unknown parameter")),
        }
        Ok(())
    }

    pub fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "min_turnaround" => Some(self.min_turnaround.to_string()),
            "search" => Some(self.search.to_string()),
            "overflow_edge" => Some(self.overflow_edge.to_string()),
            "skip_malformed" => Some(self.skip_malformed.to_string()),
            "verify" => Some(self.verify.to_string()),
            _ => None,
        }
    }

    pub fn parameters(&self) -> HashMap<String, String> {
        ["min_turnaround", "search", "overflow_edge", "skip_malformed", "verify"]
            .into_iter()
            .filter_map(|name| Some((name.to_string(), self.get_parameter(name)?)))
            .collect()
    }
}

fn parse_flag(name: &str, value: &str) -> FlowResult<bool> {
    value
        .parse()
        .map_err(|_| invalid_parameter(name, "must be true or false"))
}
