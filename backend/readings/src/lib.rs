//! # Readings
//!
//! Types shared by the inspection server and the station client.
//!
//! - [`inspection`]: records, statistics and the submission body
//! - [`verdict`]: the pass/reject rule applied to every package
//! - [`sensor`]: line protocol spoken by the external sensor device
//! - [`account`]: register/login payloads and issued sessions
pub mod account;
pub mod inspection;
pub mod sensor;
pub mod verdict;

pub use inspection::{
    InspectionRecord, InspectionStats, NewInspection, Readings, Status, Submission,
};
pub use sensor::{SensorError, parse_line};
pub use verdict::{Verdict, evaluate};
