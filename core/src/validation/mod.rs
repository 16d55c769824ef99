//! Post-solve verification of flows and plans
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod correctness;

pub use self::correctness::{CorrectnessValidator, Violation};
