//! Crew planning: minimum crew size and duty chains for a set of legs
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::decomposition::{count_paths, decompose_flow, DutyChain};
use crate::algorithm::graph::feasibility::{minimum_flow_with, FeasibilitySearch, ProbeRecord};
use crate::algorithm::graph::max_flow::{EdmondsKarp, FlowDirection};
use crate::algorithm::graph::reduction::reduce_to_max_flow;
use crate::algorithm::traits::{Algorithm, AlgorithmMetrics, Capacity, FlowError, FlowResult};
use crate::scheduling::config::{PlannerConfig, SearchStrategy};
use crate::scheduling::leg::Leg;
use crate::scheduling::network::{CrewNetwork, NetworkBuilder};
use crate::validation::correctness::{CorrectnessValidator, Violation};

/// Minimum crew and one duty chain per crew member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewPlan {
    pub pilots: Capacity,
    pub chains: Vec<DutyChain>,
    pub strategy: SearchStrategy,
    /// Unit counts probed by the search (empty for counter-flow)
    pub probes: Vec<ProbeRecord>,
    pub metrics: AlgorithmMetrics,
}

/// Plans crews for legs according to a [`PlannerConfig`]
#[derive(Debug, Clone, Default)]
pub struct CrewPlanner {
    config: PlannerConfig,
}

impl CrewPlanner {
    pub fn new(config: PlannerConfig) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn builder(&self) -> FlowResult<NetworkBuilder> {
        Ok(NetworkBuilder::new()
            .with_turnaround(self.config.min_turnaround)?
            .with_overflow_edge(self.config.overflow_edge))
    }

    pub fn plan(&self, legs: &[Leg]) -> FlowResult<CrewPlan> {
        let started = Instant::now();
        info!(
            "planning {} legs with {} search, turnaround {}",
            legs.len(),
            self.config.search,
            self.config.min_turnaround
        );

        let mut plan = match self.config.search.probe_strategy() {
            Some(strategy) => self.plan_by_search(legs, FeasibilitySearch::new(strategy))?,
            None => self.plan_by_counter_flow(legs)?,
        };
        plan.metrics.execution_time = started.elapsed();

        info!(
            "{} pilots cover {} legs ({} augmentations)",
            plan.pilots,
            legs.len(),
            plan.metrics.augmentations
        );
        Ok(plan)
    }

    /// Searches the smallest feasible unit count, then decomposes its circulation
    fn plan_by_search(&self, legs: &[Leg], mut search: FeasibilitySearch) -> FlowResult<CrewPlan> {
        let crew = self.builder()?.build(legs)?;
        let total_demand = crew.total_demand();
        let network = reduce_to_max_flow(crew.graph)?;

        let outcome = search.minimum_units(&network, total_demand)?;
        let circulation = outcome.network.into_circulation();
        let chains = decompose_flow(&circulation)?;

        if self.config.verify {
            let validator = CorrectnessValidator::new(self.config.min_turnaround);
            let mut violations = validator.check_bounds(&circulation);
            violations.extend(validator.check_demands(&circulation));
            // every duty must be a complete s -> t path in the flow itself
            violations.extend(validator.check_unit_count(count_paths(&circulation), &chains));
            self.verify(&validator, legs, outcome.units, &chains, violations)?;
        }

        Ok(CrewPlan {
            pilots: outcome.units,
            chains,
            strategy: self.config.search,
            probes: outcome.probes,
            metrics: outcome.metrics,
        })
    }

    /// Seeds one duty per leg and cancels as much of it as possible
    fn plan_by_counter_flow(&self, legs: &[Leg]) -> FlowResult<CrewPlan> {
        let CrewNetwork {
            mut graph,
            source,
            sink,
            ..
        } = self.builder()?.seeded(true).build(legs)?;

        let mut solver = EdmondsKarp::new(FlowDirection::Counter);
        let pilots = minimum_flow_with(&mut solver, &mut graph, source, sink)?;
        let chains = decompose_flow(&graph)?;

        if self.config.verify {
            let validator = CorrectnessValidator::new(self.config.min_turnaround);
            let mut violations = validator.check_bounds(&graph);
            violations.extend(validator.check_conservation(&graph, &[source, sink]));
            violations.extend(validator.check_unit_count(count_paths(&graph), &chains));
            self.verify(&validator, legs, pilots, &chains, violations)?;
        }

        Ok(CrewPlan {
            pilots,
            chains,
            strategy: self.config.search,
            probes: Vec::new(),
            metrics: solver.metrics().clone(),
        })
    }

    fn verify(
        &self,
        validator: &CorrectnessValidator,
        legs: &[Leg],
        pilots: Capacity,
        chains: &[DutyChain],
        mut violations: Vec<Violation>,
    ) -> FlowResult<()> {
        violations.extend(validator.check_chains(legs, chains));
        violations.extend(validator.check_unit_count(pilots, chains));
        if violations.is_empty() {
            return Ok(());
        }
        for violation in &violations {
            warn!("plan verification: {}", violation);
        }
        Err(FlowError::InvalidGraph(format!(
            "plan failed verification with {} violations",
            violations.len()
        )))
    }
}

impl Algorithm for CrewPlanner {
    fn name(&self) -> &'static str {
        "Crew Planner"
    }

    fn category(&self) -> &'static str {
        "planning"
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()> {
        self.config.set_parameter(name, value)
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        self.config.get_parameter(name)
    }

    fn get_parameters(&self) -> HashMap<String, String> {
        self.config.parameters()
    }
}

/// Plans `legs` with the default configuration
pub fn plan_crews(legs: &[Leg]) -> FlowResult<CrewPlan> {
    CrewPlanner::default().plan(legs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const STRATEGIES: [SearchStrategy; 3] = [
        SearchStrategy::Binary,
        SearchStrategy::Linear,
        SearchStrategy::CounterFlow,
    ];

    fn planner(search: SearchStrategy) -> CrewPlanner {
        CrewPlanner::new(PlannerConfig {
            search,
            ..PlannerConfig::default()
        })
        .unwrap()
    }

    fn sorted_chains(plan: &CrewPlan) -> Vec<Vec<usize>> {
        let mut chains: Vec<Vec<usize>> = plan.chains.iter().map(DutyChain::one_based).collect();
        chains.sort();
        chains
    }

    #[test]
    fn test_connected_legs_need_one_pilot() {
        // A -> B lands at 10, B -> C departs at 30
        let legs = [Leg::new(0, 1, 0, 10), Leg::new(1, 2, 30, 40)];
        for strategy in STRATEGIES {
            let plan = planner(strategy).plan(&legs).unwrap();
            assert_eq!(plan.pilots, 1, "{}", strategy);
            assert_eq!(sorted_chains(&plan), vec![vec![1, 2]]);
        }
    }

    #[test]
    fn test_short_turnaround_needs_two_pilots() {
        let legs = [Leg::new(0, 1, 0, 10), Leg::new(1, 2, 11, 20)];
        for strategy in STRATEGIES {
            let plan = planner(strategy).plan(&legs).unwrap();
            assert_eq!(plan.pilots, 2, "{}", strategy);
            assert_eq!(sorted_chains(&plan), vec![vec![1], vec![2]]);
        }
    }

    #[test]
    fn test_three_chained_legs() {
        let legs = [
            Leg::new(0, 1, 0, 10),
            Leg::new(1, 2, 25, 35),
            Leg::new(2, 0, 50, 60),
        ];
        for strategy in STRATEGIES {
            let plan = planner(strategy).plan(&legs).unwrap();
            assert_eq!(plan.pilots, 1);
            assert_eq!(sorted_chains(&plan), vec![vec![1, 2, 3]]);
        }
    }

    #[test]
    fn test_zero_legs() {
        for strategy in STRATEGIES {
            let plan = planner(strategy).plan(&[]).unwrap();
            assert_eq!(plan.pilots, 0);
            assert!(plan.chains.is_empty());
        }
    }

    #[test]
    fn test_strategies_agree_on_a_busy_day() {
        // two hubs shuttling back and forth with mixed gaps
        let legs = [
            Leg::new(1, 2, 0, 60),
            Leg::new(2, 1, 75, 135),
            Leg::new(1, 2, 150, 210),
            Leg::new(2, 1, 70, 130),
            Leg::new(1, 2, 140, 200),
            Leg::new(2, 1, 220, 280),
            Leg::new(1, 3, 10, 50),
            Leg::new(3, 1, 60, 100),
            Leg::new(1, 2, 120, 180),
            Leg::new(2, 3, 300, 340),
        ];
        let reference = planner(SearchStrategy::Binary).plan(&legs).unwrap();
        assert!(reference.pilots >= 1 && reference.pilots < legs.len() as Capacity);
        assert_eq!(reference.chains.len() as Capacity, reference.pilots);
        assert!(!reference.probes.is_empty());

        for strategy in [SearchStrategy::Linear, SearchStrategy::CounterFlow] {
            let plan = planner(strategy).plan(&legs).unwrap();
            assert_eq!(plan.pilots, reference.pilots, "{}", strategy);
            let covered: usize = plan.chains.iter().map(DutyChain::len).sum();
            assert_eq!(covered, legs.len());
        }
    }

    #[test]
    fn test_turnaround_is_configurable() {
        let legs = [Leg::new(0, 1, 0, 10), Leg::new(1, 2, 11, 20)];
        let mut planner = CrewPlanner::default();
        planner.set_parameter("min_turnaround", "1").unwrap();
        assert_eq!(planner.plan(&legs).unwrap().pilots, 1);
        assert_eq!(planner.get_parameter("min_turnaround").as_deref(), Some("1"));
    }

    #[test]
    fn test_planning_without_overflow_edge() {
        let legs = [Leg::new(0, 1, 0, 10), Leg::new(1, 2, 30, 40), Leg::new(5, 6, 0, 10)];
        let mut planner = planner(SearchStrategy::Binary);
        planner.set_parameter("overflow_edge", "false").unwrap();
        assert_eq!(planner.plan(&legs).unwrap().pilots, 2);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PlannerConfig {
            min_turnaround: 0,
            ..PlannerConfig::default()
        };
        assert!(CrewPlanner::new(config).is_err());
    }

    /// Legs between four airports over a short day
    fn random_legs() -> impl Strategy<Value = Vec<Leg>> {
        prop::collection::vec((0i64..4, 0i64..4, 0i64..240, 1i64..60), 0..12).prop_map(|raw| {
            raw.into_iter()
                .map(|(origin, destination, departure, duration)| {
                    Leg::new(origin, destination, departure, departure + duration)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_every_strategy_finds_the_same_valid_plan(
            legs in random_legs(),
            overflow in any::<bool>()
        ) {
            let validator = CorrectnessValidator::default();
            let mut pilots = Vec::new();
            for strategy in STRATEGIES {
                let mut planner = planner(strategy);
                planner.set_parameter("overflow_edge", &overflow.to_string()).unwrap();
                let plan = planner.plan(&legs).unwrap();

                prop_assert!(validator.check_chains(&legs, &plan.chains).is_empty(), "{}", strategy);
                prop_assert_eq!(plan.chains.len() as Capacity, plan.pilots);
                prop_assert!(plan.pilots <= legs.len() as Capacity);
                prop_assert_eq!(plan.pilots == 0, legs.is_empty());
                pilots.push(plan.pilots);
            }
            prop_assert!(pilots.windows(2).all(|w| w[0] == w[1]), "{:?}", pilots);
        }
    }
}
