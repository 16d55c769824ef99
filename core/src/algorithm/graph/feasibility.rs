//! Minimum feasible unit count
//!
//! Feasibility of a reduced network is monotone in the number of units `k`
//! injected at the source: if `k` units can cover every lower bound, so can
//! `k + 1` (the extra unit rides the overflow edge `s -> t`). The search
//! therefore probes `k` over `[1, n]` and keeps the smallest saturating value.
//!
//! Every probe clones the reduced network, retargets it to `k` and solves it
//! from scratch; the base network is never mutated.
//!
//! The counter-flow variant takes the opposite route: it starts from a flow
//! that is already feasible and pushes the maximum flow from the sink back to
//! the source. What is left is the minimum flow.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::EdmondsKarp;
use crate::algorithm::graph::reduction::ReducedNetwork;
use crate::algorithm::traits::{
    invalid_parameter, Algorithm, AlgorithmMetrics, Capacity, FlowError, FlowResult, NodeId,
};
use crate::data_structures::graph::Graph;

/// Order in which candidate unit counts are probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStrategy {
    /// Halve `[lo, hi]` after every probe
    #[default]
    Binary,
    /// Probe `k = 1, 2, ...` until one saturates
    Linear,
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStrategy::Binary => write!(f, "binary"),
            ProbeStrategy::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for ProbeStrategy {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(ProbeStrategy::Binary),
            "linear" => Ok(ProbeStrategy::Linear),
            other => Err(invalid_parameter(
                "strategy",
                format!("expected binary or linear, got {}", other),
            )),
        }
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub units: Capacity,
    /// Flow the solver pushed from `ss` to `tt`
    pub flow: Capacity,
    /// Flow needed to saturate every demand edge
    pub required: Capacity,
    pub feasible: bool,
}

/// Minimum unit count together with the network solved for it
#[derive(Debug, Clone)]
pub struct FeasibilityOutcome {
    pub units: Capacity,
    /// Solved network for `units` (unsolved when there was nothing to cover)
    pub network: ReducedNetwork,
    /// Probes in the order they ran
    pub probes: Vec<ProbeRecord>,
    pub metrics: AlgorithmMetrics,
}

/// Searches the smallest unit count for which a reduced network is feasible
#[derive(Debug, Clone, Default)]
pub struct FeasibilitySearch {
    strategy: ProbeStrategy,
    solver: EdmondsKarp,
}

impl FeasibilitySearch {
    pub fn new(strategy: ProbeStrategy) -> Self {
        Self {
            strategy,
            solver: EdmondsKarp::default(),
        }
    }

    pub fn strategy(&self) -> ProbeStrategy {
        self.strategy
    }

    /// Solves a copy of `base` retargeted to `units`
    pub fn probe(
        &mut self,
        base: &ReducedNetwork,
        units: Capacity,
    ) -> FlowResult<(ProbeRecord, ReducedNetwork)> {
        let mut network = base.clone();
        network.set_unit_count(units)?;
        let flow = network.solve(&mut self.solver)?;
        let required = network.required_flow();
        let record = ProbeRecord {
            units,
            flow,
            required,
            feasible: network.is_saturated(flow),
        };
        trace!(
            "probe k = {}: flow {} of {} ({})",
            units,
            flow,
            required,
            if record.feasible { "feasible" } else { "infeasible" }
        );
        Ok((record, network))
    }

    /// Smallest `k` in `[1, total_demand]` that
    /// saturates `base`.
    ///
    /// `total_demand <= 0` means there is nothing to cover and yields `k = 0`
    /// with an unsolved copy of `base`. Fails with [`FlowError::Infeasible`]
    /// when not even `total_demand` units suffice.
    pub fn minimum_units(
        &mut self,
        base: &ReducedNetwork,
        total_demand: Capacity,
    ) -> FlowResult<FeasibilityOutcome> {
        let started = Instant::now();
        let mut probes = Vec::new();
        let mut metrics = AlgorithmMetrics::default();

        if total_demand <= 0 {
            let mut network = base.clone();
            if network.unit_count().is_some() {
                network.set_unit_count(0)?;
            }
            metrics.execution_time = started.elapsed();
            return Ok(FeasibilityOutcome {
                units: 0,
                network,
                probes,
                metrics,
            });
        }

        let mut best: Option<(Capacity, ReducedNetwork)> = None;
        match self.strategy {
            ProbeStrategy::Binary => {
                let (mut lo, mut hi) = (1, total_demand);
                while lo <= hi {
                    let mid = lo + (hi - lo) / 2;
                    let (record, network) = self.probe(base, mid)?;
                    metrics.absorb(self.solver.metrics());
                    probes.push(record);
                    if record.feasible {
                        best = Some((mid, network));
                        hi = mid - 1;
                    } else {
                        lo = mid + 1;
                    }
                }
            }
            ProbeStrategy::Linear => {
                for units in 1..=total_demand {
                    let (record, network) = self.probe(base, units)?;
                    metrics.absorb(self.solver.metrics());
                    probes.push(record);
                    if record.feasible {
                        best = Some((units, network));
                        break;
                    }
                }
            }
        }
        metrics.execution_time = started.elapsed();

        let Some((units, network)) = best else {
            return Err(FlowError::Infeasible {
                max_units: total_demand,
            });
        };
        info!(
            "{} search settled on {} units after {} probes",
            self.strategy,
            units,
            probes.len()
        );
        Ok(FeasibilityOutcome {
            units,
            network,
            probes,
            metrics,
        })
    }
}

impl Algorithm for FeasibilitySearch {
    fn name(&self) -> &'static str {
        "Feasibility Search"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()> {
        match name {
            "strategy" => {
                self.strategy = value.parse()?;
                Ok(())
            }
            _ => Err(invalid_parameter(name, "unknown parameter")),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "strategy" => Some(self.strategy.to_string()),
            _ => None,
        }
    }

    fn get_parameters(&self) -> HashMap<String, String> {
        HashMap::from([("strategy".to_string(), self.strategy.to_string())])
    }
}

/// Minimum feasible unit count of `network`, probing in `strategy` order
pub fn minimum_feasible_unit_count(
    network: &ReducedNetwork,
    total_demand: Capacity,
    strategy: ProbeStrategy,
) -> FlowResult<Capacity> {
    FeasibilitySearch::new(strategy)
        .minimum_units(network, total_demand)
        .map(|outcome| outcome.units)
}

/// Minimum `source -> sink` flow of a graph that already carries a feasible flow.
///
/// Pushes the maximum counter-flow `sink -> source` (backward arcs never cut
/// below a lower bound) and returns the flow value that remains. The graph is
/// left carrying that minimum flow.
pub fn minimum_flow_with(
    solver: &mut EdmondsKarp,
    graph: &mut Graph,
    source: NodeId,
    sink: NodeId,
) -> FlowResult<Capacity> {
    if !graph.contains(source) || !graph.contains(sink) {
        let missing = if graph.contains(source) { sink } else { source };
        return Err(FlowError::InvalidNode(missing));
    }
    if let Some((_, edge)) = graph.edges().find(|(_, e)| !e.within_bounds()) {
        return Err(FlowError::InvalidGraph(format!(
            "counter-flow needs a feasible starting flow, edge {} -> {} carries {} outside [{}, {}]",
            edge.prev, edge.next, edge.flow, edge.lwb, edge.capacity
        )));
    }
    if let Some(node) = graph
        .nodes()
        .filter(|&v| v != source && v != sink)
        .find(|&v| graph.net_outflow(v) != 0)
    {
        return Err(FlowError::InvalidGraph(format!(
            "counter-flow needs a conserved starting flow, {} is unbalanced",
            node
        )));
    }

    let value = graph.net_outflow(source);
    let cancelled = solver.solve_between(graph, sink, source)?;
    debug!(
        "counter-flow {} -> {} cancelled {} of {} units",
        sink, source, cancelled, value
    );
    Ok(value - cancelled)
}

/// [`minimum_flow_with`] on a fresh solver
pub fn minimum_flow(graph: &mut Graph, source: NodeId, sink: NodeId) -> FlowResult<Capacity> {
    minimum_flow_with(&mut EdmondsKarp::default(), graph, source, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::decomposition::{count_starts, decompose_flow};
    use crate::algorithm::graph::reduction::reduce_to_max_flow;
    use crate::data_structures::graph::{Edge, EdgeKind, Vertex, VertexRole};
    use proptest::prelude::*;

    /// `n` legs with the given `(from, to)` links; every leg starts at `s`
    /// and finishes at `t`. With `seeded`, each leg carries its own unit.
    fn legs_network(n: usize, links: &[(usize, usize)], seeded: bool) -> Graph {
        let units = n as Capacity;
        let unit = Capacity::from(seeded);
        let mut graph = Graph::new();
        for leg in 0..n {
            let origin = graph.add_vertex(Vertex::new(0, 0, 0).with_role(VertexRole::Origin(leg)));
            let dest =
                graph.add_vertex(Vertex::new(0, 0, 0).with_role(VertexRole::Destination(leg)));
            graph
                .add_edge(Edge::new(origin, dest, 1).with_lower_bound(1).with_kind(EdgeKind::Flight))
                .unwrap();
        }
        for &(from, to) in links {
            graph
                .add_edge(Edge::new(NodeId(2 * from + 1), NodeId(2 * to), 1).with_kind(EdgeKind::Link))
                .unwrap();
        }
        let s = graph.add_vertex(Vertex::auxiliary(VertexRole::Source, -units));
        let t = graph.add_vertex(Vertex::auxiliary(VertexRole::Sink, units));
        for leg in 0..n {
            graph
                .add_edge(Edge::new(s, NodeId(2 * leg), 1).with_flow(unit).with_kind(EdgeKind::Start))
                .unwrap();
            graph
                .add_edge(Edge::new(NodeId(2 * leg + 1), t, 1).with_flow(unit).with_kind(EdgeKind::Finish))
                .unwrap();
        }
        graph
            .add_edge(Edge::new(s, t, units).with_kind(EdgeKind::Overflow))
            .unwrap();
        graph
    }

    fn reduced(n: usize, links: &[(usize, usize)]) -> ReducedNetwork {
        reduce_to_max_flow(legs_network(n, links, false)).unwrap()
    }

    #[test]
    fn test_feasibility_is_monotone() {
        let network = reduced(3, &[(0, 1)]);
        let mut search = FeasibilitySearch::default();
        let verdicts: Vec<bool> = (1..=3)
            .map(|k| search.probe(&network, k).unwrap().0.feasible)
            .collect();
        assert_eq!(verdicts, vec![false, true, true]);
    }

    #[test]
    fn test_binary_and_linear_agree() {
        let cases: Vec<(usize, Vec<(usize, usize)>, Capacity)> = vec![
            (1, vec![], 1),
            (2, vec![], 2),
            (2, vec![(0, 1)], 1),
            (3, vec![(0, 1), (1, 2)], 1),
            (3, vec![(0, 2)], 2),
            (4, vec![(0, 1), (2, 3)], 2),
        ];
        for (n, links, expected) in cases {
            let network = reduced(n, &links);
            for strategy in [ProbeStrategy::Binary, ProbeStrategy::Linear] {
                let outcome = FeasibilitySearch::new(strategy)
                    .minimum_units(&network, n as Capacity)
                    .unwrap();
                assert_eq!(outcome.units, expected, "{} on {} legs {:?}", strategy, n, links);
                assert_eq!(outcome.network.unit_count(), Some(expected));
                assert!(outcome.probes.iter().any(|p| p.feasible && p.units == expected));
            }
        }
    }

    #[test]
    fn test_linear_stops_at_first_feasible() {
        let network = reduced(4, &[(0, 1), (1, 2), (2, 3)]);
        let outcome = FeasibilitySearch::new(ProbeStrategy::Linear)
            .minimum_units(&network, 4)
            .unwrap();
        assert_eq!(outcome.units, 1);
        assert_eq!(outcome.probes.len(), 1);
        assert!(outcome.metrics.augmentations > 0);
    }

    #[test]
    fn test_probe_leaves_base_untouched() {
        let network = reduced(2, &[(0, 1)]);
        let mut search = FeasibilitySearch::default();
        search.probe(&network, 1).unwrap();
        assert!(network.graph().edges().all(|(_, e)| e.flow == 0));
        assert_eq!(network.unit_count(), Some(2));
    }

    #[test]
    fn test_nothing_to_cover_is_zero_units() {
        let network = reduced(0, &[]);
        let outcome = FeasibilitySearch::default().minimum_units(&network, 0).unwrap();
        assert_eq!(outcome.units, 0);
        assert!(outcome.probes.is_empty());
        assert_eq!(minimum_feasible_unit_count(&network, 0, ProbeStrategy::Linear).unwrap(), 0);
    }

    #[test]
    fn test_insufficient_range_is_infeasible() {
        // two unlinked legs cannot be covered by a single unit
        let network = reduced(2, &[]);
        let err = FeasibilitySearch::default().minimum_units(&network, 1).unwrap_err();
        assert!(matches!(err, FlowError::Infeasible { max_units: 1 }));
    }

    #[test]
    fn test_counter_flow_matches_search() {
        for (n, links) in [
            (2, vec![(0, 1)]),
            (3, vec![(0, 1), (1, 2)]),
            (3, vec![(0, 2)]),
            (4, vec![(0, 1), (2, 3), (1, 3)]),
        ] {
            let mut seeded = legs_network(n, &links, true);
            let s = seeded.find_role(VertexRole::Source).unwrap();
            let t = seeded.find_role(VertexRole::Sink).unwrap();
            let counter = minimum_flow(&mut seeded, s, t).unwrap();

            let expected =
                minimum_feasible_unit_count(&reduced(n, &links), n as Capacity, ProbeStrategy::Binary)
                    .unwrap();
            assert_eq!(counter, expected, "{} legs {:?}", n, links);
            assert!(seeded.edges().all(|(_, e)| e.within_bounds()));
        }
    }

    #[test]
    fn test_counter_flow_rejects_unbalanced_start() {
        // legs are not seeded: flights carry their unit but nothing feeds them
        let mut graph = legs_network(2, &[], false);
        let s = graph.find_role(VertexRole::Source).unwrap();
        let t = graph.find_role(VertexRole::Sink).unwrap();
        assert!(matches!(minimum_flow(&mut graph, s, t), Err(FlowError::InvalidGraph(_))));
        assert!(matches!(
            minimum_flow(&mut graph, s, NodeId(99)),
            Err(FlowError::InvalidNode(NodeId(99)))
        ));
    }

    #[test]
    fn test_parameters() {
        let mut search = FeasibilitySearch::default();
        assert_eq!(search.get_parameter("strategy").as_deref(), Some("binary"));
        search.set_parameter("strategy", "linear").unwrap();
        assert_eq!(search.strategy(), ProbeStrategy::Linear);
        assert!(search.set_parameter("strategy", "ternary").is_err());
        assert!(search.set_parameter("depth", "3").is_err());
    }

    /// Links always point from an earlier leg to a later one, so the legs form a DAG
    fn forward_links(n: usize, pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
        let mut links: Vec<(usize, usize)> = pairs
            .iter()
            .map(|&(a, b)| (a % n, b % n))
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        links.sort_unstable();
        links.dedup();
        links
    }

    proptest! {
        #[test]
        fn test_feasibility_is_monotone_in_units(
            n in 1usize..8,
            pairs in prop::collection::vec((0usize..8, 0usize..8), 0..16)
        ) {
            let links = forward_links(n, &pairs);
            let network = reduced(n, &links);
            let mut search = FeasibilitySearch::default();
            let verdicts: Vec<bool> = (1..=n as Capacity)
                .map(|k| search.probe(&network, k).unwrap().0.feasible)
                .collect();

            prop_assert!(verdicts.windows(2).all(|w| !w[0] || w[1]), "{:?}", verdicts);
            prop_assert_eq!(verdicts.last().copied(), Some(true));
        }

        #[test]
        fn test_strategies_and_decomposition_agree(
            n in 1usize..8,
            pairs in prop::collection::vec((0usize..8, 0usize..8), 0..16)
        ) {
            let links = forward_links(n, &pairs);
            let network = reduced(n, &links);
            let binary = FeasibilitySearch::new(ProbeStrategy::Binary)
                .minimum_units(&network, n as Capacity)
                .unwrap();
            let linear =
                minimum_feasible_unit_count(&network, n as Capacity, ProbeStrategy::Linear).unwrap();
            prop_assert_eq!(binary.units, linear);

            let mut seeded = legs_network(n, &links, true);
            let s = seeded.find_role(VertexRole::Source).unwrap();
            let t = seeded.find_role(VertexRole::Sink).unwrap();
            prop_assert_eq!(minimum_flow(&mut seeded, s, t).unwrap(), binary.units);

            let circulation = binary.network.into_circulation();
            let chains = decompose_flow(&circulation).unwrap();
            prop_assert_eq!(chains.len() as Capacity, binary.units);
            prop_assert_eq!(count_starts(&circulation), binary.units);

            let mut flown: Vec<usize> = chains.iter().flat_map(|c| c.legs.iter().copied()).collect();
            flown.sort_unstable();
            prop_assert_eq!(flown, (0..n).collect::<Vec<_>>());
        }
    }
}
