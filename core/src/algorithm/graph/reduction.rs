//! Circulation with demands and lower bounds, reduced to plain max-flow
//!
//! Two transformations, applied in this order:
//!
//! 1. **Lower-bound elimination.** Every edge with `lwb > 0` is treated as
//!    already carrying `lwb` units: its capacity and flow drop by `lwb`, the
//!    amount is recorded in `shifted`, and the endpoints absorb it into their
//!    demands (`prev.demand += lwb`, `next.demand -= lwb`).
//! 2. **Demand balancing.** A super-source `ss` feeds every vertex with
//!    negative demand (`ss -> v`, capacity `-demand`) and every vertex with
//!    positive demand drains into a super-sink `tt` (`v -> tt`, capacity
//!    `demand`).
//!
//! A circulation meeting all demands and bounds exists iff the maximum
//! `ss -> tt` flow equals the sum of positive demands. [`ReducedNetwork::into_circulation`]
//! maps a solved network back onto the original graph.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::graph::max_flow::EdmondsKarp;
use crate::algorithm::traits::{Capacity, EdgeId, FlowError, FlowResult, NodeId};
use crate::data_structures::graph::{Edge, EdgeKind, Graph, Vertex, VertexRole};

/// Max-flow instance equivalent to a circulation-with-demands problem
#[derive(Debug, Clone)]
pub struct ReducedNetwork {
    graph: Graph,
    /// Size of the original graph, restored by `into_circulation`
    original_nodes: usize,
    original_edges: usize,
    super_source: NodeId,
    super_sink: NodeId,
    /// Domain source `s` and sink `t`, when the graph has them
    source: Option<NodeId>,
    sink: Option<NodeId>,
    /// `ss -> s`
    supply_edge: Option<EdgeId>,
    /// `t -> tt`
    drain_edge: Option<EdgeId>,
    /// `s -> t`
    overflow_edge: Option<EdgeId>,
    /// A lower bound was shifted into the demand of `s` or `t`
    terminal_shift: bool,
}

/// Builds the demand-balanced instance for `graph`.
///
/// The graph must carry exactly its lower bounds (no flow above them yet)
/// and must not have been reduced already.
pub fn reduce_to_max_flow(mut graph: Graph) -> FlowResult<ReducedNetwork> {
    if let Some((_, edge)) = graph.edges().find(|(_, e)| e.kind.is_reduction()) {
        return Err(FlowError::InvalidGraph(format!(
            "graph is already reduced, {:?} edge {} -> {}",
            edge.kind, edge.prev, edge.next
        )));
    }
    if let Some((_, edge)) = graph.edges().find(|(_, e)| e.flow != e.lwb) {
        return Err(FlowError::InvalidGraph(format!(
            "reduction expects flow at the lower bound, edge {} -> {} carries {} (lwb {})",
            edge.prev, edge.next, edge.flow, edge.lwb
        )));
    }

    let original_nodes = graph.node_count();
    let original_edges = graph.edge_count();
    let source = graph.find_role(VertexRole::Source);
    let sink = graph.find_role(VertexRole::Sink);
    let is_terminal = |node: NodeId| Some(node) == source || Some(node) == sink;
    let terminal_shift = graph
        .edges()
        .any(|(_, e)| e.lwb > 0 && (is_terminal(e.prev) || is_terminal(e.next)));

    eliminate_lower_bounds(&mut graph);

    let super_source = graph.add_vertex(Vertex::auxiliary(VertexRole::SuperSource, 0));
    let super_sink = graph.add_vertex(Vertex::auxiliary(VertexRole::SuperSink, 0));

    let mut supply_edge = None;
    let mut drain_edge = None;
    for node in (0..original_nodes).map(NodeId) {
        let demand = graph.vertex(node).demand;
        // s and t always get their edge so the unit count can be retargeted later
        if demand < 0 || (Some(node) == source && demand == 0) {
            let id = graph.add_edge(
                Edge::new(super_source, node, -demand).with_kind(EdgeKind::Supply),
            )?;
            if Some(node) == source {
                supply_edge = Some(id);
            }
        } else if demand > 0 || (Some(node) == sink && demand == 0) {
            let id =
                graph.add_edge(Edge::new(node, super_sink, demand).with_kind(EdgeKind::Drain))?;
            if Some(node) == sink {
                drain_edge = Some(id);
            }
        }
    }

    let overflow_edge = match (source, sink) {
        (Some(s), Some(t)) => graph
            .find_edge(s, t)
            .filter(|&id| graph.edge(id).kind == EdgeKind::Overflow),
        _ => None,
    };

    let network = ReducedNetwork {
        graph,
        original_nodes,
        original_edges,
        super_source,
        super_sink,
        source,
        sink,
        supply_edge,
        drain_edge,
        overflow_edge,
        terminal_shift,
    };
    debug!(
        "reduced {} vertices / {} edges to max-flow instance with {} edges, required flow {}",
        original_nodes,
        original_edges,
        network.graph.edge_count(),
        network.required_flow()
    );
    Ok(network)
}

/// Moves every lower bound into the endpoint demands
fn eliminate_lower_bounds(graph: &mut Graph) {
    let bounded: Vec<EdgeId> = graph
        .edges()
        .filter(|(_, e)| e.lwb > 0)
        .map(|(id, _)| id)
        .collect();

    for id in bounded {
        let edge = graph.edge_mut(id);
        let lwb = edge.lwb;
        edge.capacity -= lwb;
        edge.flow -= lwb;
        edge.shifted += lwb;
        edge.lwb = 0;
        let (prev, next) = (edge.prev, edge.next);

        graph.vertex_mut(prev).demand += lwb;
        graph.vertex_mut(next).demand -= lwb;
    }
}

impl ReducedNetwork {
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn super_source(&self) -> NodeId {
        self.super_source
    }

    #[inline]
    pub fn super_sink(&self) -> NodeId {
        self.super_sink
    }

    #[inline]
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> Option<NodeId> {
        self.sink
    }

    /// Units currently demanded at `s`, if the network has one
    pub fn unit_count(&self) -> Option<Capacity> {
        self.source.map(|s| -self.graph.vertex(s).demand)
    }

    /// Sum of positive demands: the flow a feasible circulation saturates
    pub fn required_flow(&self) -> Capacity {
        self.graph
            .vertices()
            .map(|(_, v)| v.demand)
            .filter(|&d| d > 0)
            .sum()
    }

    /// Injects `k` units at `s`/`t` without rebuilding the network.
    ///
    /// Sets `s.demand = -k`, `t.demand = k`, retargets `ss -> s` and `t -> tt`
    /// to capacity `k`, and the overflow edge `s -> t` (when present) as well.
    pub fn set_unit_count(&mut self, k: Capacity) -> FlowResult<()> {
        if k < 0 {
            return Err(FlowError::InvalidGraph(format!("negative unit count {}", k)));
        }
        let (Some(s), Some(t), Some(supply), Some(drain)) =
            (self.source, self.sink, self.supply_edge, self.drain_edge)
        else {
            return Err(FlowError::InvalidGraph(
                "network has no source/sink layout to carry a unit count".to_string(),
            ));
        };
        if self.terminal_shift {
            return Err(FlowError::InvalidGraph(
                "unit count cannot be retargeted when lower bounds touch s or t".to_string(),
            ));
        }

        self.graph.set_capacity(supply, k)?;
        self.graph.set_capacity(drain, k)?;
        if let Some(overflow) = self.overflow_edge {
            self.graph.set_capacity(overflow, k)?;
        }
        self.graph.vertex_mut(s).demand = -k;
        self.graph.vertex_mut(t).demand = k;
        Ok(())
    }

    /// Runs the driver from `ss` to `tt` and returns the flow it added
    pub fn solve(&mut self, solver: &mut EdmondsKarp) -> FlowResult<Capacity> {
        let (ss, tt) = (self.super_source, self.super_sink);
        solver.solve(&mut self.graph, ss, tt)
    }

    /// True when `flow` saturates every demand edge
    #[inline]
    pub fn is_saturated(&self, flow: Capacity) -> bool {
        flow == self.required_flow()
    }

    /// Maps the solved instance back onto the original graph.
    ///
    /// Lower bounds return to their edges (flow includes the forced units),
    /// demands return to their original values, and `ss`/`tt` with their edges
    /// are dropped. On a saturated network the result is a circulation
    /// meeting every demand and bound.
    pub fn into_circulation(mut self) -> Graph {
        let shifted: Vec<EdgeId> = self
            .graph
            .edges()
            .filter(|(_, e)| e.shifted > 0)
            .map(|(id, _)| id)
            .collect();

        for id in shifted {
            let edge = self.graph.edge_mut(id);
            let lwb = edge.shifted;
            edge.capacity += lwb;
            edge.flow += lwb;
            edge.lwb = lwb;
            edge.shifted = 0;
            let (prev, next) = (edge.prev, edge.next);

            self.graph.vertex_mut(prev).demand -= lwb;
            self.graph.vertex_mut(next).demand += lwb;
        }

        self.graph.truncate(self.original_nodes, self.original_edges);
        self.graph
    }
}
