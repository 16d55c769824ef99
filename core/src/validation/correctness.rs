//! Correctness checks for solved flows and duty plans
//!
//! Each check returns every violation it finds instead of stopping at the
//! first one, so a failed plan can be reported in full.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::graph::decomposition::DutyChain;
use crate::algorithm::traits::{Capacity, NodeId};
use crate::data_structures::graph::Graph;
use crate::scheduling::leg::Leg;
use crate::scheduling::network::DEFAULT_MIN_TURNAROUND;

/// A broken invariant of a flow or a plan
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Violation {
    #[error("edge {prev} -> {next} carries {flow} outside [{lwb}, {capacity}]")]
    CapacityBounds {
        prev: NodeId,
        next: NodeId,
        lwb: Capacity,
        flow: Capacity,
        capacity: Capacity,
    },

    #[error("flow is not conserved at {node} (net outflow {balance})")]
    Conservation { node: NodeId, balance: Capacity },

    #[error("{node} has net outflow {actual}, demand requires {expected}")]
    Demand {
        node: NodeId,
        expected: Capacity,
        actual: Capacity,
    },

    #[error("leg {0} is flown by more than one crew member")]
    DuplicateLeg(usize),

    #[error("leg {0} is not covered by any duty")]
    MissingLeg(usize),

    #[error("duty refers to unknown leg {0}")]
    UnknownLeg(usize),

    #[error("leg {second} departs {gap} after leg {first} lands, below the turnaround")]
    Turnaround {
        first: usize,
        second: usize,
        gap: i64,
    },

    #[error("leg {second} does not depart where leg {first} lands")]
    AirportMismatch { first: usize, second: usize },

    #[error("{actual} duties for a crew of {expected}")]
    UnitMismatch { expected: Capacity, actual: Capacity },
}

/// Validates flows and duty chains against the planning rules
#[derive(Debug, Clone)]
pub struct CorrectnessValidator {
    min_turnaround: i64,
}

impl Default for CorrectnessValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TURNAROUND)
    }
}

impl CorrectnessValidator {
    pub fn new(min_turnaround: i64) -> Self {
        Self { min_turnaround }
    }

    /// `lwb <= flow <= capacity` on every edge
    pub fn check_bounds(&self, graph: &Graph) -> Vec<Violation> {
        graph
            .edges()
            .filter(|(_, e)| !e.within_bounds())
            .map(|(_, e)| Violation::CapacityBounds {
                prev: e.prev,
                next: e.next,
                lwb: e.lwb,
                flow: e.flow,
                capacity: e.capacity,
            })
            .collect()
    }

    /// Zero net `flow` at every vertex except `exempt`
    pub fn check_conservation(&self, graph: &Graph, exempt: &[NodeId]) -> Vec<Violation> {
        graph
            .net_flow_balances()
            .into_iter()
            .enumerate()
            .map(|(node, balance)| (NodeId(node), balance))
            .filter(|(node, balance)| *balance != 0 && !exempt.contains(node))
            .map(|(node, balance)| Violation::Conservation { node, balance })
            .collect()
    }

    /// Net carried outflow equals `-demand` at every vertex (a circulation meeting demands)
    pub fn check_demands(&self, graph: &Graph) -> Vec<Violation> {
        graph
            .vertices()
            .filter_map(|(node, vertex)| {
                let actual = graph.net_outflow(node);
                let expected = -vertex.demand;
                (actual != expected).then_some(Violation::Demand {
                    node,
                    expected,
                    actual,
                })
            })
            .collect()
    }

    /// Every leg in exactly one chain, consecutive legs connectable
    pub fn check_chains(&self, legs: &[Leg], chains: &[DutyChain]) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut covered = vec![0usize; legs.len()];

        for chain in chains {
            for &leg in &chain.legs {
                match covered.get_mut(leg) {
                    Some(count) => *count += 1,
                    None => violations.push(Violation::UnknownLeg(leg)),
                }
            }
            for pair in chain.legs.windows(2) {
                let (first, second) = (pair[0], pair[1]);
                let (Some(a), Some(b)) = (legs.get(first), legs.get(second)) else {
                    continue;
                };
                if a.destination != b.origin {
                    violations.push(Violation::AirportMismatch { first, second });
                }
                let gap = b.departure - a.arrival;
                if gap < self.min_turnaround {
                    violations.push(Violation::Turnaround { first, second, gap });
                }
            }
        }

        for (leg, &count) in covered.iter().enumerate() {
            if count == 0 {
                violations.push(Violation::MissingLeg(leg));
            } else if count > 1 {
                violations.push(Violation::DuplicateLeg(leg));
            }
        }
        violations
    }

    /// One chain per crew member
    pub fn check_unit_count(&self, units: Capacity, chains: &[DutyChain]) -> Vec<Violation> {
        let actual = chains.len() as Capacity;
        if actual == units {
            Vec::new()
        } else {
            vec![Violation::UnitMismatch {
                expected: units,
                actual,
            }]
        }
    }
}
