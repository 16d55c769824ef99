//! Crew scheduling on top of the flow engine
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod config;
pub mod format;
pub mod leg;
pub mod network;
pub mod planner;

pub use self::config::{PlannerConfig, SearchStrategy};
pub use self::format::{format_chains, to_json, write_plan};
pub use self::leg::{parse_legs, parse_legs_str, Leg};
pub use self::network::{CrewNetwork, NetworkBuilder, DEFAULT_MIN_TURNAROUND};
pub use self::planner::{plan_crews, CrewPlan, CrewPlanner};
