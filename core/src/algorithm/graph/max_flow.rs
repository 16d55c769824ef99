//! Maximum Flow Algorithm Implementation
//!
//! This module implements the Edmonds-Karp maximum flow algorithm: repeated
//! shortest augmenting path search over a residual graph rebuilt from the
//! base graph before every search. The base graph is mutated in place.
//!
//! # Theoretical Foundation
//! Every augmentation raises the flow by at least one unit (integral
//! capacities), and the total is bounded by the capacity leaving `begin`, so
//! the loop terminates. Shortest paths bound the number of augmentations by
//! O(V·E), giving O(V·E²) overall.
//!
//! Lower bounds are honored natively: backward residual arcs only offer
//! `flow - lwb`, so cancellation never drops an edge below its bound. That is
//! what makes the counter direction (`end -> begin`) usable as a minimum-flow
//! step on a graph that already carries a feasible flow.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::augmenting_path::{augment, PathSearch};
use crate::algorithm::graph::residual::ResidualGraph;
use crate::algorithm::traits::{
    invalid_parameter, Algorithm, AlgorithmMetrics, Capacity, FlowError, FlowResult, NodeId,
};
use crate::data_structures::graph::Graph;

/// Which way the driver pushes flow between the terminal pair it is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// From the source to the sink
    Forward,
    /// From the sink back to the source (maximum counter-flow)
    Counter,
}

impl FlowDirection {
    /// Orders `(source, sink)` into `(begin, end)`
    pub fn terminals(self, source: NodeId, sink: NodeId) -> (NodeId, NodeId) {
        match self {
            FlowDirection::Forward => (source, sink),
            FlowDirection::Counter => (sink, source),
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDirection::Forward => write!(f, "forward"),
            FlowDirection::Counter => write!(f, "counter"),
        }
    }
}

impl FromStr for FlowDirection {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(FlowDirection::Forward),
            "counter" => Ok(FlowDirection::Counter),
            other => Err(invalid_parameter(
                "direction",
                format!("expected forward or counter, got {}", other),
            )),
        }
    }
}

/// Maximum flow result with cut information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxFlowResult {
    /// Maximum flow value
    pub max_flow: Capacity,
    /// Vertices on the `begin` side of a minimum cut
    pub min_cut: Vec<NodeId>,
    /// Algorithm performance metrics
    pub metrics: AlgorithmMetrics,
}

/// Edmonds-Karp driver with reusable residual and search buffers
#[derive(Debug, Clone)]
pub struct EdmondsKarp {
    direction: FlowDirection,
    residual: ResidualGraph,
    search: PathSearch,
    /// Counters of the most recent solve
    metrics: AlgorithmMetrics,
}

impl Default for EdmondsKarp {
    fn default() -> Self {
        Self::new(FlowDirection::Forward)
    }
}

impl EdmondsKarp {
    pub fn new(direction: FlowDirection) -> Self {
        Self {
            direction,
            residual: ResidualGraph::new(),
            search: PathSearch::new(),
            metrics: AlgorithmMetrics::default(),
        }
    }

    pub fn direction(&self) -> FlowDirection {
        self.direction
    }

    /// Counters of the most recent solve
    pub fn metrics(&self) -> &AlgorithmMetrics {
        &self.metrics
    }

    /// Pushes flow between `source` and `sink` (in the configured direction)
    /// until no augmenting path remains; returns the flow added by this call.
    ///
    /// Fails with [`FlowError::InvalidNode`] when either terminal is not a
    /// vertex of `graph`.
    pub fn solve(&mut self, graph: &mut Graph, source: NodeId, sink: NodeId) -> FlowResult<Capacity> {
        let (begin, end) = self.direction.terminals(source, sink);
        self.solve_between(graph, begin, end)
    }

    /// Runs the augmentation loop from `begin` to `end` regardless of direction
    pub fn solve_between(
        &mut self,
        graph: &mut Graph,
        begin: NodeId,
        end: NodeId,
    ) -> FlowResult<Capacity> {
        for terminal in [begin, end] {
            if !graph.contains(terminal) {
                return Err(FlowError::InvalidNode(terminal));
            }
        }

        let started = Instant::now();
        self.metrics = AlgorithmMetrics {
            solves: 1,
            ..AlgorithmMetrics::default()
        };

        let mut total: Capacity = 0;
        loop {
            self.residual.rebuild(graph);
            self.metrics.residual_rebuilds += 1;

            let path = self.search.shortest_path(&self.residual, begin, end);
            self.metrics.nodes_explored += self.search.explored();
            if path.is_empty() {
                break;
            }

            let gained = augment(graph, &path);
            total += gained;
            self.metrics.augmentations += 1;
            trace!(
                "augmentation {}: +{} (total {}) over {} arcs",
                self.metrics.augmentations,
                gained,
                total,
                path.len()
            );
        }

        self.metrics.execution_time = started.elapsed();
        debug!(
            "Edmonds-Karp {} -> {}: flow {} after {} augmentations in {:?}",
            begin, end, total, self.metrics.augmentations, self.metrics.execution_time
        );
        Ok(total)
    }

    /// Solves and reports the cut separating `begin` from `end` afterwards
    pub fn solve_with_cut(
        &mut self,
        graph: &mut Graph,
        source: NodeId,
        sink: NodeId,
    ) -> FlowResult<MaxFlowResult> {
        let max_flow = self.solve(graph, source, sink)?;
        let (begin, _) = self.direction.terminals(source, sink);
        Ok(MaxFlowResult {
            max_flow,
            min_cut: reachable_in_residual(graph, begin),
            metrics: self.metrics.clone(),
        })
    }
}

impl Algorithm for EdmondsKarp {
    fn name(&self) -> &'static str {
        "Edmonds-Karp"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()> {
        match name {
            "direction" => {
                self.direction = value.parse()?;
                Ok(())
            }
            _ => Err(invalid_parameter(name, "unknown parameter")),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "direction" => Some(self.direction.to_string()),
            _ => None,
        }
    }

    fn get_parameters(&self) -> HashMap<String, String> {
        HashMap::from([("direction".to_string(), self.direction.to_string())])
    }
}

/// Maximum flow from `source` to `sink`, mutating `graph` in place
pub fn solve_max_flow(graph: &mut Graph, source: NodeId, sink: NodeId) -> FlowResult<Capacity> {
    EdmondsKarp::new(FlowDirection::Forward).solve(graph, source, sink)
}

/// Vertices reachable from `begin` in the residual graph of `graph`; empty
/// when `begin` is not a vertex
pub fn reachable_in_residual(graph: &Graph, begin: NodeId) -> Vec<NodeId> {
    if !graph.contains(begin) {
        return Vec::new();
    }
    let residual = ResidualGraph::from_graph(graph);
    let mut seen = vec![false; graph.node_count()];
    let mut stack = vec![begin];
    seen[begin.as_usize()] = true;
    while let Some(node) = stack.pop() {
        for arc in residual.arcs_from(node) {
            if !seen[arc.to.as_usize()] {
                seen[arc.to.as_usize()] = true;
                stack.push(arc.to);
            }
        }
    }
    graph.nodes().filter(|v| seen[v.as_usize()]).collect()
}

/// Capacity of the edges leaving `side` towards the rest of the graph
pub fn cut_capacity(graph: &Graph, side: &[NodeId]) -> Capacity {
    let mut inside = vec![false; graph.node_count()];
    for node in side {
        inside[node.as_usize()] = true;
    }
    graph
        .edges()
        .filter(|(_, e)| inside[e.prev.as_usize()] && !inside[e.next.as_usize()])
        .map(|(_, e)| e.capacity)
        .sum()
}
