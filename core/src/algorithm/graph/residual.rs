//! Residual graph construction
//!
//! The residual graph holds the admissible augmenting moves of a base
//! [`Graph`]. It is derived data: the driver rebuilds it from the base graph
//! before every path search, reusing the adjacency buffers between rebuilds.
//!
//! For each base edge `u -> v`:
//! - `capacity - flow > 0` yields a forward arc `u -> v` of that value
//! - `flow - lwb > 0` yields a backward arc `v -> u` of that value, tagged `back`
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{Capacity, NodeId};
use crate::data_structures::graph::Graph;

/// One admissible move in the residual graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualArc {
    pub from: NodeId,
    pub to: NodeId,
    /// Units that can be pushed along the arc
    pub value: Capacity,
    /// True for undo arcs that cancel flow on the base edge `to -> from`
    pub back: bool,
}

impl ResidualArc {
    /// Endpoint pair of the base edge this arc acts on
    #[inline]
    pub fn base_endpoints(&self) -> (NodeId, NodeId) {
        if self.back {
            (self.to, self.from)
        } else {
            (self.from, self.to)
        }
    }
}

/// Residual graph with the same vertex set as its base graph
#[derive(Debug, Clone, Default)]
pub struct ResidualGraph {
    adjacency: Vec<Vec<ResidualArc>>,
    arc_count: usize,
}

impl ResidualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: &Graph) -> Self {
        let mut residual = Self::new();
        residual.rebuild(graph);
        residual
    }

    /// Replaces every arc with the ones derived from `graph`
    pub fn rebuild(&mut self, graph: &Graph) {
        self.adjacency.resize_with(graph.node_count(), Vec::new);
        self.adjacency.truncate(graph.node_count());
        for arcs in &mut self.adjacency {
            arcs.clear();
        }
        self.arc_count = 0;

        for node in graph.nodes() {
            for (_, edge) in graph.out_edges(node) {
                let spare = edge.residual_capacity();
                if spare > 0 {
                    self.push(ResidualArc {
                        from: edge.prev,
                        to: edge.next,
                        value: spare,
                        back: false,
                    });
                }
                let cancellable = edge.cancellable_flow();
                if cancellable > 0 {
                    self.push(ResidualArc {
                        from: edge.next,
                        to: edge.prev,
                        value: cancellable,
                        back: true,
                    });
                }
            }
        }
    }

    fn push(&mut self, arc: ResidualArc) {
        self.adjacency[arc.from.as_usize()].push(arc);
        self.arc_count += 1;
    }

    #[inline]
    pub fn arcs_from(&self, node: NodeId) -> &[ResidualArc] {
        &self.adjacency[node.as_usize()]
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn arc_count(&self) -> usize {
        self.arc_count
    }
}
