//! crewflow: reads flight legs and prints the minimum set of duty chains
//!
//! Legs come from the file given as INPUT, or stdin. Each output line lists
//! the 1-based legs flown by one crew member.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use clap::{arg, ArgAction, ArgMatches, Command};
use crewflow_core::scheduling::{parse_legs, to_json, write_plan, CrewPlanner, PlannerConfig};
use crewflow_core::FlowResult;
use log::debug;

fn cli() -> Command {
    Command::new("crewflow")
        .about("Computes the minimum crew covering a set of flight legs")
        .arg(
            arg!([INPUT] "Leg file, one 'origin destination departure arrival' per line (stdin if omitted)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--config [CONFIG] "Planner configuration json file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--search [SEARCH] "Search strategy: binary, linear or counter_flow")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            arg!(--turnaround [MINUTES] "Minimum gap between landing and the next departure")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(arg!(--count "Print the crew size after the chains").action(ArgAction::SetTrue))
        .arg(arg!(--json "Print the whole plan as json").action(ArgAction::SetTrue))
        .arg(arg!(-v --verbose "Log solver progress").action(ArgAction::SetTrue))
}

fn main() {
    let matches = cli().get_matches();

    let default_filter = if matches.get_flag("verbose") { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> FlowResult<()> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PlannerConfig::from_json_file(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(search) = matches.get_one::<String>("search") {
        config.set_parameter("search", search)?;
    }
    if let Some(turnaround) = matches.get_one::<i64>("turnaround") {
        config.set_parameter("min_turnaround", &turnaround.to_string())?;
    }
    debug!("configuration: {:?}", config);

    let legs = match matches.get_one::<PathBuf>("INPUT") {
        Some(path) => parse_legs(BufReader::new(File::open(path)?), config.skip_malformed)?,
        None => parse_legs(io::stdin().lock(), config.skip_malformed)?,
    };

    let plan = CrewPlanner::new(config)?.plan(&legs)?;

    let mut out = io::stdout().lock();
    if matches.get_flag("json") {
        writeln!(out, "{}", to_json(&plan)?)?;
    } else {
        write_plan(&mut out, &plan, matches.get_flag("count"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_parses_flags() {
        let matches = cli()
            .try_get_matches_from(["crewflow", "legs.txt", "--search", "linear", "--turnaround", "20", "--count"])
            .unwrap();
        assert_eq!(matches.get_one::<PathBuf>("INPUT"), Some(&PathBuf::from("legs.txt")));
        assert_eq!(matches.get_one::<String>("search").map(String::as_str), Some("linear"));
        assert_eq!(matches.get_one::<i64>("turnaround"), Some(&20));
        assert!(matches.get_flag("count"));
        assert!(!matches.get_flag("json"));
    }
}
