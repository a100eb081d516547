//! # Sensor Line Protocol
//!
//! The station's sensor device writes one reading per line:
//!
//! ```text
//! T:21.5,W:480,S:1
//! ```
//!
//! - `T`: temperature in °C
//! - `W`: weight in grams
//! - `S`: seal state, `1`/`0` or `true`/`false`
//!
//! Fields may come in any order and surrounding whitespace is ignored. Every
//! key must appear exactly once.
use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::inspection::Readings;

pub const TEMPERATURE_KEY: &str = "T";
pub const WEIGHT_KEY: &str = "W";
pub const SEAL_KEY: &str = "S";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SensorError {
    #[error("Empty line")]
    Empty,

    #[error("Malformed field '{0}', expected KEY:VALUE")]
    MalformedField(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("Missing key '{0}'")]
    MissingKey(&'static str),

    #[error("Invalid number '{value}' for key '{key}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("Invalid seal state '{0}'")]
    InvalidSeal(String),
}

pub fn parse_line(line: &str) -> Result<Readings, SensorError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(SensorError::Empty);
    }

    let mut temperature = None;
    let mut weight = None;
    let mut is_sealed = None;

    for field in line.split(',') {
        let field = field.trim();
        let (key, value) = field
            .split_once(':')
            .ok_or_else(|| SensorError::MalformedField(field.to_string()))?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            TEMPERATURE_KEY => set_once(&mut temperature, key, number(TEMPERATURE_KEY, value)?)?,
            WEIGHT_KEY => set_once(&mut weight, key, number(WEIGHT_KEY, value)?)?,
            SEAL_KEY => set_once(&mut is_sealed, key, seal(value)?)?,
            _ => return Err(SensorError::UnknownKey(key.to_string())),
        }
    }

    Ok(Readings {
        temperature: temperature.ok_or(SensorError::MissingKey(TEMPERATURE_KEY))?,
        weight: weight.ok_or(SensorError::MissingKey(WEIGHT_KEY))?,
        is_sealed: is_sealed.ok_or(SensorError::MissingKey(SEAL_KEY))?,
    })
}

fn set_once<T>(slot: &mut Option<T>, key: &str, value: T) -> Result<(), SensorError> {
    if slot.replace(value).is_some() {
        return Err(SensorError::DuplicateKey(key.to_string()));
    }

    Ok(())
}

fn number(key: &'static str, value: &str) -> Result<f64, SensorError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| SensorError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

fn seal(value: &str) -> Result<bool, SensorError> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(SensorError::InvalidSeal(value.to_string())),
    }
}

impl FromStr for Readings {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

impl fmt::Display for Readings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TEMPERATURE_KEY}:{},{WEIGHT_KEY}:{},{SEAL_KEY}:{}",
            self.temperature,
            self.weight,
            u8::from(self.is_sealed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_line() {
        let readings = parse_line("T:21.5,W:480,S:1").unwrap();

        assert_eq!(
            readings,
            Readings {
                temperature: 21.5,
                weight: 480.0,
                is_sealed: true,
            }
        );
    }

    #[test]
    fn test_any_order_and_whitespace() {
        let readings: Readings = "  S:false , T: -3 ,W:1200\r\n".parse().unwrap();

        assert_eq!(readings.temperature, -3.0);
        assert_eq!(readings.weight, 1200.0);
        assert!(!readings.is_sealed);
    }

    #[test]
    fn test_display_is_parseable() {
        let readings = Readings {
            temperature: 4.25,
            weight: 100.0,
            is_sealed: false,
        };

        assert_eq!(readings.to_string(), "T:4.25,W:100,S:0");
        assert_eq!(parse_line(&readings.to_string()).unwrap(), readings);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse_line(""), Err(SensorError::Empty));
        assert_eq!(parse_line("   \n"), Err(SensorError::Empty));
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(parse_line("T:1,W:200"), Err(SensorError::MissingKey("S")));
        assert_eq!(parse_line("S:1,W:200"), Err(SensorError::MissingKey("T")));
    }

    #[test]
    fn test_duplicate_key() {
        assert_eq!(
            parse_line("T:1,T:2,W:200,S:1"),
            Err(SensorError::DuplicateKey("T".into()))
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_line("T:1,W:200,S:1,H:40"),
            Err(SensorError::UnknownKey("H".into()))
        );
    }

    #[test]
    fn test_malformed_field() {
        assert_eq!(
            parse_line("T=1,W:200,S:1"),
            Err(SensorError::MalformedField("T=1".into()))
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_line("T:warm,W:200,S:1"),
            Err(SensorError::InvalidNumber {
                key: "T",
                value: "warm".into()
            })
        );
        assert_eq!(
            parse_line("T:1,W:inf,S:1"),
            Err(SensorError::InvalidNumber {
                key: "W",
                value: "inf".into()
            })
        );
        assert_eq!(
            parse_line("T:1,W:200,S:yes"),
            Err(SensorError::InvalidSeal("yes".into()))
        );
    }
}
