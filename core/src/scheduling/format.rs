//! Plan rendering
//!
//! Text output is one line per duty chain with 1-based leg numbers separated
//! by single spaces, optionally followed by the crew size. JSON output is the
//! serialized [`CrewPlan`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::io::{self, Write};

use crate::algorithm::graph::decomposition::DutyChain;
use crate::algorithm::traits::FlowResult;
use crate::scheduling::planner::CrewPlan;

/// Duty chains, one per line
pub fn format_chains(chains: &[DutyChain]) -> String {
    let mut out = String::new();
    for chain in chains {
        out.push_str(&chain.to_string());
        out.push('\n');
    }
    out
}

/// Writes the chains and, with `show_count`, a final line with the crew size
pub fn write_plan<W: Write>(writer: &mut W, plan: &CrewPlan, show_count: bool) -> io::Result<()> {
    writer.write_all(format_chains(&plan.chains).as_bytes())?;
    if show_count {
        writeln!(writer, "{}", plan.pilots)?;
    }
    Ok(())
}

pub fn to_json(plan: &CrewPlan) -> FlowResult<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}
