//! Crew network assembly
//!
//! Leg `i` becomes the vertex pair `2i` (origin) and `2i + 1` (destination)
//! joined by a flight edge that must carry exactly one unit. A destination
//! links to every later origin at the same airport that departs at least
//! `min_turnaround` after it lands. The source `s` and sink `t` follow the leg
//! vertices, so every leg can also open or close a duty.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use log::debug;

use crate::algorithm::traits::{invalid_parameter, Capacity, FlowResult, NodeId};
use crate::data_structures::graph::{Edge, EdgeKind, Graph, Vertex, VertexRole};
use crate::scheduling::leg::Leg;

/// Default minimum gap between landing and the next departure
pub const DEFAULT_MIN_TURNAROUND: i64 = 15;

/// Crew network over a set of legs
#[derive(Debug, Clone)]
pub struct CrewNetwork {
    pub graph: Graph,
    pub source: NodeId,
    pub sink: NodeId,
    pub leg_count: usize,
}

impl CrewNetwork {
    /// Upper bound on the crew size: one member per leg
    #[inline]
    pub fn total_demand(&self) -> Capacity {
        self.leg_count as Capacity
    }

    #[inline]
    pub fn origin(leg: usize) -> NodeId {
        NodeId(2 * leg)
    }

    #[inline]
    pub fn destination(leg: usize) -> NodeId {
        NodeId(2 * leg + 1)
    }
}

/// Builds [`CrewNetwork`]s from legs
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    min_turnaround: i64,
    overflow_edge: bool,
    seed_trivial_flow: bool,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self {
            min_turnaround: DEFAULT_MIN_TURNAROUND,
            overflow_edge: true,
            seed_trivial_flow: false,
        }
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum gap between two legs of the same duty; must be positive
    pub fn with_turnaround(mut self, min_turnaround: i64) -> FlowResult<Self> {
        if min_turnaround <= 0 {
            return Err(invalid_parameter(
                "min_turnaround",
                format!("must be positive, got {}", min_turnaround),
            ));
        }
        self.min_turnaround = min_turnaround;
        Ok(self)
    }

    /// Adds `s -> t` so surplus units can skip every leg
    pub fn with_overflow_edge(mut self, enabled: bool) -> Self {
        self.overflow_edge = enabled;
        self
    }

    /// Starts every leg as its own duty: start, flight and finish edges carry one unit
    pub fn seeded(mut self, enabled: bool) -> Self {
        self.seed_trivial_flow = enabled;
        self
    }

    pub fn build(&self, legs: &[Leg]) -> FlowResult<CrewNetwork> {
        let leg_count = legs.len();
        let units = leg_count as Capacity;
        let unit = Capacity::from(self.seed_trivial_flow);
        let mut graph = Graph::with_capacity(2 * leg_count + 4, 4 * leg_count + 1);

        // airport -> destination vertices landing there
        let mut landings: HashMap<i64, Vec<NodeId>> = HashMap::new();
        for (leg, flight) in legs.iter().enumerate() {
            let origin = graph.add_vertex(
                Vertex::new(flight.origin, flight.departure, 0).with_role(VertexRole::Origin(leg)),
            );
            let destination = graph.add_vertex(
                Vertex::new(flight.destination, flight.arrival, 0)
                    .with_role(VertexRole::Destination(leg)),
            );
            graph.add_edge(
                Edge::new(origin, destination, 1)
                    .with_lower_bound(1)
                    .with_kind(EdgeKind::Flight),
            )?;
            landings.entry(flight.destination).or_default().push(destination);
        }

        let mut links = 0;
        for leg in 0..leg_count {
            let origin = CrewNetwork::origin(leg);
            let (airport, departure) = {
                let vertex = graph.vertex(origin);
                (vertex.airport, vertex.time)
            };
            let Some(landed) = landings.get(&airport) else {
                continue;
            };
            for &destination in landed {
                if departure - graph.vertex(destination).time >= self.min_turnaround {
                    graph.add_edge(Edge::new(destination, origin, 1).with_kind(EdgeKind::Link))?;
                    links += 1;
                }
            }
        }

        let source = graph.add_vertex(Vertex::auxiliary(VertexRole::Source, -units));
        let sink = graph.add_vertex(Vertex::auxiliary(VertexRole::Sink, units));
        for leg in 0..leg_count {
            graph.add_edge(
                Edge::new(source, CrewNetwork::origin(leg), 1)
                    .with_flow(unit)
                    .with_kind(EdgeKind::Start),
            )?;
            graph.add_edge(
                Edge::new(CrewNetwork::destination(leg), sink, 1)
                    .with_flow(unit)
                    .with_kind(EdgeKind::Finish),
            )?;
        }
        if self.overflow_edge {
            graph.add_edge(Edge::new(source, sink, units).with_kind(EdgeKind::Overflow))?;
        }

        debug!(
            "built crew network: {} legs, {} links, turnaround {}",
            leg_count, links, self.min_turnaround
        );
        Ok(CrewNetwork {
            graph,
            source,
            sink,
            leg_count,
        })
    }
}
