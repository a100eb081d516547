use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::verdict::{Verdict, evaluate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw sensor values for one package.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readings {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Grams.
    pub weight: f64,
    pub is_sealed: bool,
}

/// An inspection that has been judged but not yet stored.
///
/// Only [`NewInspection::evaluate`] builds one, so `status` and `reason` always
/// match the readings they were derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct NewInspection {
    pub package_id: String,
    pub readings: Readings,
    pub verdict: Verdict,
    pub image_data: Option<String>,
}

impl NewInspection {
    pub fn evaluate(package_id: String, readings: Readings, image_data: Option<String>) -> Self {
        let verdict = evaluate(&readings);

        Self {
            package_id,
            readings,
            verdict,
            image_data,
        }
    }

    pub fn into_record(self, id: String, timestamp: DateTime<Utc>) -> InspectionRecord {
        InspectionRecord {
            id,
            package_id: self.package_id,
            temperature: self.readings.temperature,
            weight: self.readings.weight,
            is_sealed: self.readings.is_sealed,
            status: self.verdict.status,
            image_data: self.image_data,
            reason: self.verdict.reason,
            timestamp,
        }
    }
}

/// A stored inspection. Immutable once written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub package_id: String,
    pub temperature: f64,
    pub weight: f64,
    pub is_sealed: bool,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionStats {
    pub total_packages: u64,
    pub passed_packages: u64,
    pub rejected_packages: u64,
    pub sealed_packages: u64,
    pub unsealed_packages: u64,
}

/// Request body a station sends to create an inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub package_id: String,
    pub temperature: f64,
    pub weight: f64,
    pub is_sealed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl Submission {
    pub fn new(package_id: String, readings: Readings, image_data: Option<String>) -> Self {
        Self {
            package_id,
            temperature: readings.temperature,
            weight: readings.weight,
            is_sealed: readings.is_sealed,
            image_data,
        }
    }

    pub fn readings(&self) -> Readings {
        Readings {
            temperature: self.temperature,
            weight: self.weight,
            is_sealed: self.is_sealed,
        }
    }
}
