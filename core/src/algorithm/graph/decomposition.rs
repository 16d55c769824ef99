//! Flow decomposition into duty chains
//!
//! A saturating flow on a crew network is a set of unit paths
//! `s -> origin -> destination -> origin -> ... -> t`. Each path is one duty
//! chain: the legs a single crew member flies in order.
//!
//! The walk reads `flow + shifted`, so it accepts both the reduced network
//! (lower bounds moved into demands) and the restored circulation. Link usage
//! is tracked in a scratch vector local to the call; the graph is not touched.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{Capacity, FlowError, FlowResult, NodeId};
use crate::data_structures::graph::{EdgeKind, Graph, VertexRole};

/// Legs flown by one crew member, in order (0-based leg indices)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DutyChain {
    pub legs: Vec<usize>,
}

impl DutyChain {
    /// Leg numbers as printed to users (first leg is 1)
    pub fn one_based(&self) -> Vec<usize> {
        self.legs.iter().map(|leg| leg + 1).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

impl fmt::Display for DutyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for leg in self.one_based() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", leg)?;
            first = false;
        }
        Ok(())
    }
}

/// One chain per unit leaving `s` on a start edge.
///
/// Fails with [`FlowError::InvalidGraph`] when the graph has no source or a
/// start edge does not lead into a leg origin with its flight.
pub fn decompose_flow(graph: &Graph) -> FlowResult<Vec<DutyChain>> {
    let source = graph
        .find_role(VertexRole::Source)
        .ok_or_else(|| FlowError::InvalidGraph("decomposition needs a source vertex".to_string()))?;

    let mut remaining: Vec<Capacity> = graph.edges().map(|(_, e)| e.carried()).collect();
    let mut chains = Vec::new();

    let starts: Vec<(usize, NodeId)> = graph
        .out_edges(source)
        .filter(|(_, e)| e.kind == EdgeKind::Start)
        .map(|(id, e)| (id.as_usize(), e.next))
        .collect();

    for (start, first_origin) in starts {
        while remaining[start] > 0 {
            remaining[start] -= 1;
            chains.push(walk_chain(graph, &mut remaining, first_origin)?);
        }
    }

    debug!(
        "decomposed flow into {} chains covering {} legs",
        chains.len(),
        chains.iter().map(DutyChain::len).sum::<usize>()
    );
    Ok(chains)
}

/// Follows one unit from `origin` over links with remaining flow until it
/// leaves a destination on its finish edge to `t`
fn walk_chain(graph: &Graph, remaining: &mut [Capacity], origin: NodeId) -> FlowResult<DutyChain> {
    let mut chain = DutyChain::default();
    let mut origin = origin;
    loop {
        let VertexRole::Origin(leg) = graph.vertex(origin).role else {
            return Err(FlowError::InvalidGraph(format!(
                "chain reached {} which is not a leg origin",
                origin
            )));
        };
        let destination = graph
            .out_edges(origin)
            .find(|(_, e)| e.kind == EdgeKind::Flight)
            .map(|(_, e)| e.next)
            .ok_or_else(|| {
                FlowError::InvalidGraph(format!("leg {} has no flight edge out of {}", leg, origin))
            })?;
        chain.legs.push(leg);

        let link = graph
            .out_edges(destination)
            .find(|(id, e)| e.kind == EdgeKind::Link && remaining[id.as_usize()] > 0);
        match link {
            Some((id, edge)) => {
                remaining[id.as_usize()] -= 1;
                origin = edge.next;
            }
            None => {
                let finish = graph
                    .out_edges(destination)
                    .find(|(id, e)| e.kind == EdgeKind::Finish && remaining[id.as_usize()] > 0)
                    .map(|(id, _)| id)
                    .ok_or_else(|| {
                        FlowError::InvalidGraph(format!(
                            "unit on leg {} stops at {} without reaching the sink",
                            leg, destination
                        ))
                    })?;
                remaining[finish.as_usize()] -= 1;
                return Ok(chain);
            }
        }
    }
}

/// Units leaving `s` on start edges; equals the number of duty chains
pub fn count_starts(graph: &Graph) -> Capacity {
    graph
        .find_role(VertexRole::Source)
        .map(|s| {
            graph
                .out_edges(s)
                .filter(|(_, e)| e.kind == EdgeKind::Start)
                .map(|(_, e)| e.carried())
                .sum()
        })
        .unwrap_or(0)
}

/// Start edges carrying flow whose leg origin still reaches `t` over carried flow
pub fn count_paths(graph: &Graph) -> Capacity {
    let (Some(source), Some(sink)) = (
        graph.find_role(VertexRole::Source),
        graph.find_role(VertexRole::Sink),
    ) else {
        return 0;
    };
    graph
        .out_edges(source)
        .filter(|(_, e)| e.kind == EdgeKind::Start && e.carried() > 0)
        .filter(|(_, e)| has_flow_path(graph, e.next, sink))
        .count() as Capacity
}

/// True when `to` is reachable from `from` over edges carrying flow
pub fn has_flow_path(graph: &Graph, from: NodeId, to: NodeId) -> bool {
    if !graph.contains(from) || !graph.contains(to) {
        return false;
    }
    let mut visited = vec![false; graph.node_count()];
    let mut queue = VecDeque::from([from]);
    visited[from.as_usize()] = true;

    while let Some(node) = queue.pop_front() {
        if node == to {
            return true;
        }
        for (_, edge) in graph.out_edges(node) {
            if edge.carried() > 0 && !visited[edge.next.as_usize()] {
                visited[edge.next.as_usize()] = true;
                queue.push_back(edge.next);
            }
        }
    }
    false
}
