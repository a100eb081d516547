//! # Verdict
//!
//! Three independent checks, always all evaluated:
//!
//! 1. Temperature within 0-25 °C
//! 2. Weight within 100-1000 g
//! 3. Package sealed
//!
//! Any failure rejects the package. The reason lists one sentence per failed
//! check in the order above.
use std::ops::RangeInclusive;

use crate::inspection::{Readings, Status};

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=25.0;
pub const WEIGHT_RANGE: RangeInclusive<f64> = 100.0..=1000.0;
pub const ACCEPTED_REASON: &str = "All parameters within acceptable range";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub reason: String,
}

pub fn evaluate(readings: &Readings) -> Verdict {
    let mut failures = Vec::with_capacity(3);

    if !TEMPERATURE_RANGE.contains(&readings.temperature) {
        failures.push(format!(
            "Temperature out of range ({}°C).",
            number(readings.temperature)
        ));
    }

    if !WEIGHT_RANGE.contains(&readings.weight) {
        failures.push(format!("Weight out of range ({}g).", number(readings.weight)));
    }

    if !readings.is_sealed {
        failures.push("Package is unsealed.".to_string());
    }

    if failures.is_empty() {
        return Verdict {
            status: Status::Passed,
            reason: ACCEPTED_REASON.to_string(),
        };
    }

    Verdict {
        status: Status::Rejected,
        reason: failures.join(" "),
    }
}

// Renders the way JavaScript prints a number: `30` not `30.0`, never `-0`,
// and exponent form outside [1e-6, 1e21) with an explicit `+` on positive
// exponents.
fn number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exponent = format!("{value:e}");
    match exponent.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exponent,
    }
}
