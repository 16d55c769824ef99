//! Capacitated flow graph with lower bounds and vertex demands
//!
//! This module implements the base graph every flow component operates on.
//! Edges live in an indexed store owned by the graph and are referenced by
//! stable [`EdgeId`] handles; each vertex keeps its outgoing handles in
//! insertion order, and a `(prev, next)` lookup map guarantees at most one
//! edge per ordered vertex pair.
//!
//! # Invariants
//! - `lwb <= flow <= capacity` on every edge after every mutation
//! - at most one edge per ordered pair `(prev, next)`
//! - handles stay valid for the lifetime of the graph (no removal except
//!   truncation of the most recently added tail)
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{Capacity, EdgeId, FlowError, FlowResult, NodeId};

/// Sentinel airport ids carried by the auxiliary vertices
pub const SOURCE_SENTINEL: i64 = -1;
pub const SINK_SENTINEL: i64 = -2;
pub const SUPER_SOURCE_SENTINEL: i64 = -3;
pub const SUPER_SINK_SENTINEL: i64 = -4;

/// Role a vertex plays in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexRole {
    /// Hand-built vertex with no domain meaning
    Plain,
    /// Departure of the leg with the given 0-based index
    Origin(usize),
    /// Arrival of the leg with the given 0-based index
    Destination(usize),
    /// Domain source `s`
    Source,
    /// Domain sink `t`
    Sink,
    /// Super-source `ss` added by the demand reduction
    SuperSource,
    /// Super-sink `tt` added by the demand reduction
    SuperSink,
}

/// Domain meaning of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Hand-built edge with no domain meaning
    Plain,
    /// Origin to destination of one leg
    Flight,
    /// Destination of one leg to the origin of a later leg at the same airport
    Link,
    /// `s` to a leg origin: a duty begins here
    Start,
    /// Leg destination to `t`: a duty ends here
    Finish,
    /// `s` to `t`: absorbs units that fly nothing
    Overflow,
    /// `ss` to a vertex with negative demand
    Supply,
    /// Vertex with positive demand to `tt`
    Drain,
}

impl EdgeKind {
    /// Edges added by the demand reduction rather than by graph assembly
    pub fn is_reduction(self) -> bool {
        matches!(self, EdgeKind::Supply | EdgeKind::Drain)
    }
}

/// Vertex record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Airport id, or a negative sentinel for auxiliary vertices
    pub airport: i64,
    /// Scheduling instant, meaningful for leg vertices only
    pub time: i64,
    /// Negative: must emit `-demand`; positive: must absorb `demand`
    pub demand: Capacity,
    /// Role in the network
    pub role: VertexRole,
    /// Outgoing edge handles in insertion order
    adjacency: Vec<EdgeId>,
}

impl Vertex {
    pub fn new(airport: i64, time: i64, demand: Capacity) -> Self {
        Self {
            airport,
            time,
            demand,
            role: VertexRole::Plain,
            adjacency: Vec::new(),
        }
    }

    /// Plain vertex carrying only a demand
    pub fn with_demand(demand: Capacity) -> Self {
        Self::new(0, 0, demand)
    }

    /// One of the four auxiliary vertices, tagged with its sentinel airport
    pub fn auxiliary(role: VertexRole, demand: Capacity) -> Self {
        let sentinel = match role {
            VertexRole::Source => SOURCE_SENTINEL,
            VertexRole::Sink => SINK_SENTINEL,
            VertexRole::SuperSource => SUPER_SOURCE_SENTINEL,
            VertexRole::SuperSink => SUPER_SINK_SENTINEL,
            _ => 0,
        };
        Self::new(sentinel, sentinel, demand).with_role(role)
    }

    pub fn with_role(mut self, role: VertexRole) -> Self {
        self.role = role;
        self
    }

    #[inline]
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.adjacency
    }
}

/// Directed, capacitated edge `prev -> next`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub prev: NodeId,
    pub next: NodeId,
    /// Current assignment, `lwb <= flow <= capacity`
    pub flow: Capacity,
    /// Upper bound
    pub capacity: Capacity,
    /// Lower bound
    pub lwb: Capacity,
    /// Units of lower bound moved into the endpoint demands by the reduction
    pub shifted: Capacity,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(prev: NodeId, next: NodeId, capacity: Capacity) -> Self {
        Self {
            prev,
            next,
            flow: 0,
            capacity,
            lwb: 0,
            shifted: 0,
            kind: EdgeKind::Plain,
        }
    }

    /// Sets the lower bound and raises the flow to meet it
    pub fn with_lower_bound(mut self, lwb: Capacity) -> Self {
        self.lwb = lwb;
        self.flow = self.flow.max(lwb);
        self
    }

    pub fn with_flow(mut self, flow: Capacity) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Spare capacity available to a forward residual arc
    #[inline]
    pub fn residual_capacity(&self) -> Capacity {
        self.capacity - self.flow
    }

    /// Flow above the lower bound available to a backward residual arc
    #[inline]
    pub fn cancellable_flow(&self) -> Capacity {
        self.flow - self.lwb
    }

    /// Units actually routed over the edge, counting the pre-routed lower bound
    #[inline]
    pub fn carried(&self) -> Capacity {
        self.flow + self.shifted
    }

    #[inline]
    pub fn within_bounds(&self) -> bool {
        self.lwb <= self.flow && self.flow <= self.capacity
    }

    /// Panics when the edge leaves `[lwb, capacity]`
    #[inline]
    pub fn assert_within_bounds(&self) {
        assert!(
            self.within_bounds(),
            "edge {} -> {} violates lwb <= flow <= capacity ({} <= {} <= {})",
            self.prev,
            self.next,
            self.lwb,
            self.flow,
            self.capacity
        );
    }
}

/// Flow graph owning its vertices and edges
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// Hash map for O(1) lookups by endpoint pair
    lookup: HashMap<(NodeId, NodeId), EdgeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            lookup: HashMap::with_capacity(edges),
        }
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> NodeId {
        let id = NodeId(self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    /// Adds an edge; rejects unknown endpoints, duplicates and inconsistent bounds
    pub fn add_edge(&mut self, edge: Edge) -> FlowResult<EdgeId> {
        for endpoint in [edge.prev, edge.next] {
            if endpoint.as_usize() >= self.vertices.len() {
                return Err(FlowError::InvalidNode(endpoint));
            }
        }
        if self.lookup.contains_key(&(edge.prev, edge.next)) {
            return Err(FlowError::DuplicateEdge(edge.prev, edge.next));
        }
        if edge.shifted < 0 || !edge.within_bounds() {
            return Err(FlowError::InvalidGraph(format!(
                "edge {} -> {} has inconsistent bounds (lwb {}, flow {}, capacity {})",
                edge.prev, edge.next, edge.lwb, edge.flow, edge.capacity
            )));
        }

        let id = EdgeId(self.edges.len());
        self.vertices[edge.prev.as_usize()].adjacency.push(id);
        self.lookup.insert((edge.prev, edge.next), id);
        self.edges.push(edge);
        Ok(id)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.vertices.len()).map(NodeId)
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.as_usize() < self.vertices.len()
    }

    #[inline]
    pub fn vertex(&self, node: NodeId) -> &Vertex {
        &self.vertices[node.as_usize()]
    }

    #[inline]
    pub fn vertex_mut(&mut self, node: NodeId) -> &mut Vertex {
        &mut self.vertices[node.as_usize()]
    }

    pub fn vertices(&self) -> impl Iterator<Item = (NodeId, &Vertex)> {
        self.vertices.iter().enumerate().map(|(i, v)| (NodeId(i), v))
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.as_usize()]
    }

    /// Mutable access for in-place flow and capacity updates
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.as_usize()]
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// Outgoing edges of `node` in insertion order
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.vertices[node.as_usize()]
            .adjacency
            .iter()
            .map(move |&id| (id, &self.edges[id.as_usize()]))
    }

    #[inline]
    pub fn find_edge(&self, prev: NodeId, next: NodeId) -> Option<EdgeId> {
        self.lookup.get(&(prev, next)).copied()
    }

    #[inline]
    pub fn has_edge(&self, prev: NodeId, next: NodeId) -> bool {
        self.lookup.contains_key(&(prev, next))
    }

    /// First vertex carrying `role`
    pub fn find_role(&self, role: VertexRole) -> Option<NodeId> {
        self.vertices
            .iter()
            .position(|v| v.role == role)
            .map(NodeId)
    }

    /// Retargets an edge's upper bound; the current flow must still fit
    pub fn set_capacity(&mut self, id: EdgeId, capacity: Capacity) -> FlowResult<()> {
        let edge = &mut self.edges[id.as_usize()];
        if edge.flow > capacity || edge.lwb > capacity {
            return Err(FlowError::InvalidGraph(format!(
                "cannot lower capacity of {} -> {} to {} below flow {} / lower bound {}",
                edge.prev, edge.next, capacity, edge.flow, edge.lwb
            )));
        }
        edge.capacity = capacity;
        Ok(())
    }

    /// Sum of capacities leaving `node`
    pub fn capacity_out_of(&self, node: NodeId) -> Capacity {
        self.out_edges(node).map(|(_, e)| e.capacity).sum()
    }

    /// Carried flow leaving `node` minus carried flow entering it
    pub fn net_outflow(&self, node: NodeId) -> Capacity {
        let mut balance = 0;
        for edge in &self.edges {
            if edge.prev == node {
                balance += edge.carried();
            }
            if edge.next == node {
                balance -= edge.carried();
            }
        }
        balance
    }

    /// Net outflow of every vertex in one pass, using the solver's `flow` field only
    pub fn net_flow_balances(&self) -> Vec<Capacity> {
        let mut balance = vec![0; self.vertices.len()];
        for edge in &self.edges {
            balance[edge.prev.as_usize()] += edge.flow;
            balance[edge.next.as_usize()] -= edge.flow;
        }
        balance
    }

    /// Drops every vertex from `node_count` on and every edge from `edge_count` on.
    ///
    /// Only valid when the dropped edges are exactly the ones added after the
    /// kept prefix, i.e. the graph is rolled back to an earlier size.
    pub fn truncate(&mut self, node_count: usize, edge_count: usize) {
        for edge in self.edges.drain(edge_count..) {
            self.lookup.remove(&(edge.prev, edge.next));
        }
        self.vertices.truncate(node_count);
        for vertex in &mut self.vertices {
            vertex.adjacency.retain(|id| id.as_usize() < edge_count);
        }
        debug_assert!(self
            .edges
            .iter()
            .all(|e| e.prev.as_usize() < node_count && e.next.as_usize() < node_count));
    }
}
