//! Flight legs and their text input format
//!
//! One leg per line: `origin destination departure arrival`, four
//! whitespace-separated non-negative integers. Blank lines and lines starting
//! with `#` are ignored.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::io::BufRead;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{FlowError, FlowResult};

/// A scheduled flight between two airports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leg {
    /// Departure airport
    pub origin: i64,
    /// Arrival airport
    pub destination: i64,
    /// Departure instant
    pub departure: i64,
    /// Arrival instant
    pub arrival: i64,
}

impl Leg {
    pub fn new(origin: i64, destination: i64, departure: i64, arrival: i64) -> Self {
        Self {
            origin,
            destination,
            departure,
            arrival,
        }
    }

    /// True when one crew member can fly `next` right after `self`
    pub fn can_precede(&self, next: &Leg, min_turnaround: i64) -> bool {
        self.destination == next.origin && next.departure - self.arrival >= min_turnaround
    }

    /// Parses one record; the error is the reason the record was rejected
    fn parse_record(record: &str) -> Result<Self, String> {
        let fields: Vec<&str> = record.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(format!("expected 4 fields, found {}", fields.len()));
        }

        let mut values = [0i64; 4];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field
                .parse()
                .map_err(|_| format!("'{}' is not an integer", field))?;
            if *value < 0 {
                return Err(format!("'{}' is negative", field));
            }
        }

        let [origin, destination, departure, arrival] = values;
        if arrival < departure {
            return Err(format!("arrival {} precedes departure {}", arrival, departure));
        }
        Ok(Self::new(origin, destination, departure, arrival))
    }
}

/// Reads legs until end of input.
///
/// Malformed records fail with [`FlowError::Parse`] (1-based line number),
/// or are logged and skipped when `skip_malformed` is set.
pub fn parse_legs<R: BufRead>(reader: R, skip_malformed: bool) -> FlowResult<Vec<Leg>> {
    let mut legs = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let record = line.trim();
        if record.is_empty() || record.starts_with('#') {
            continue;
        }

        match Leg::parse_record(record) {
            Ok(leg) => legs.push(leg),
            Err(reason) if skip_malformed => {
                warn!("skipping line {}: {}", index + 1, reason);
            }
            Err(reason) => {
                return Err(FlowError::Parse {
                    line: index + 1,
                    reason,
                })
            }
        }
    }
    Ok(legs)
}

/// [`parse_legs`] over an in-memory string
pub fn parse_legs_str(input: &str, skip_malformed: bool) -> FlowResult<Vec<Leg>> {
    parse_legs(input.as_bytes(), skip_malformed)
}
