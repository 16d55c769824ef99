//! Core identifiers, error types and the parameter trait of the flow engine
//!
//! Every component of the engine (graph store, residual builder, Edmonds-Karp
//! driver, demand reduction, feasibility search, decomposition) speaks in
//! terms of the handles and error values defined here.
//!
//! # Key Design Principles
//! - Typed handles (`NodeId`, `EdgeId`) instead of raw indices
//! - Integral capacities, so every augmentation gains at least one unit
//! - Recoverable failures are values; broken invariants panic
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Flow, capacity, lower bound and demand quantities
pub type Capacity = i64;

/// Node identifier ensuring type safety and preventing mixing with other numeric types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stable handle of an edge inside the graph's edge store
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Comprehensive error types for flow operations
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid node: {0}")]
    InvalidNode(NodeId),

    #[error("Duplicate edge: {0} -> {1}")]
    DuplicateEdge(NodeId, NodeId),

    #[error("Invalid graph state: {0}")]
    InvalidGraph(String),

    #[error("No feasible unit count in [1, {max_units}]")]
    Infeasible { max_units: Capacity },

    #[error("Malformed leg on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type FlowResult<T> = Result<T, FlowError>;

/// Algorithm execution metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    /// Augmenting paths applied
    pub augmentations: usize,
    /// Residual graph rebuilds (one per path search)
    pub residual_rebuilds: usize,
    /// Vertices dequeued across all path searches
    pub nodes_explored: usize,
    /// Full max-flow solves
    pub solves: usize,
    /// Wall-clock time spent solving
    pub execution_time: Duration,
}

impl AlgorithmMetrics {
    /// Folds another run's counters into this one
    pub fn absorb(&mut self, other: &AlgorithmMetrics) {
        self.augmentations += other.augmentations;
        self.residual_rebuilds += other.residual_rebuilds;
        self.nodes_explored += other.nodes_explored;
        self.solves += other.solves;
        self.execution_time += other.execution_time;
    }
}

/// String-typed parameter surface shared by the solvers and the planner
pub trait Algorithm {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g. max_flow, planning)
    fn category(&self) -> &'static str;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;

    /// Returns all parameters with their current values
    fn get_parameters(&self) -> HashMap<String, String>;
}

/// Builds the `InvalidParameter` error for a rejected value
pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> FlowError {
    FlowError::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_type_safety() {
        let node1 = NodeId(42);
        let node2 = NodeId(42);
        let node3 = NodeId(43);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
        assert_eq!(node1.as_usize(), 42);
        assert_eq!(node3.to_string(), "v43");
        assert_eq!(EdgeId(7).to_string(), "e7");
    }

    #[test]
    fn test_metrics_absorb() {
        let mut total = AlgorithmMetrics::default();
        let run = AlgorithmMetrics {
            augmentations: 3,
            residual_rebuilds: 4,
            nodes_explored: 20,
            solves: 1,
            execution_time: Duration::from_millis(2),
        };

        total.absorb(&run);
        total.absorb(&run);

        assert_eq!(total.augmentations, 6);
        assert_eq!(total.residual_rebuilds, 8);
        assert_eq!(total.solves, 2);
        assert_eq!(total.execution_time, Duration::from_millis(4));
    }

    #[test]
    fn test_error_messages() {
        let err = FlowError::Parse {
            line: 3,
            reason: "expected 4 fields, found 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed leg on line 3: expected 4 fields, found 2"
        );

        let err = invalid_parameter("search", "unknown strategy");
        assert_eq!(err.to_string(), "Invalid parameter: search - unknown strategy");
    }
}
