//! Flow algorithms over capacitated graphs with lower bounds and demands
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod augmenting_path;
pub mod decomposition;
pub mod feasibility;
pub mod max_flow;
pub mod reduction;
pub mod residual;

pub use self::augmenting_path::{augment, bottleneck, shortest_augmenting_path, AugmentingPath, PathSearch};
pub use self::decomposition::{
    count_paths, count_starts, decompose_flow, has_flow_path, DutyChain,
};
pub use self::feasibility::{
    minimum_feasible_unit_count, minimum_flow, minimum_flow_with, FeasibilityOutcome,
    FeasibilitySearch, ProbeRecord, ProbeStrategy,
};
pub use self::max_flow::{cut_capacity, reachable_in_residual, solve_max_flow, EdmondsKarp, FlowDirection, MaxFlowResult};
pub use self::reduction::{reduce_to_max_flow, ReducedNetwork};
pub use self::residual::{ResidualArc, ResidualGraph};
