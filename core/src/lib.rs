//! crewflow: minimum crew planning over a circulation-with-demands max-flow engine
//!
//! Legs become a network whose flight edges must carry exactly one unit.
//! Lower bounds and vertex demands are reduced to a plain `ss -> tt`
//! maximum-flow instance solved by Edmonds-Karp, the smallest feasible number
//! of units is searched, and the resulting flow is decomposed into duty chains.
//!
//! ```
//! use crewflow_core::scheduling::{plan_crews, Leg};
//!
//! let legs = [Leg::new(0, 1, 0, 10), Leg::new(1, 2, 30, 40)];
//! let plan = plan_crews(&legs).unwrap();
//! assert_eq!(plan.pilots, 1);
//! assert_eq!(plan.chains[0].one_based(), vec![1, 2]);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod scheduling;
pub mod validation;

pub use crate::algorithm::traits::{Algorithm, AlgorithmMetrics, Capacity, EdgeId, FlowError, FlowResult, NodeId};
