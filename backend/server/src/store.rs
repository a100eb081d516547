//! # Stores
//!
//! Persistence seams. Handlers only see these traits; [`crate::database`] backs
//! them with redis and [`crate::memory`] keeps everything in process.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use readings::{InspectionRecord, InspectionStats, NewInspection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Most records a listing ever returns.
pub const LIST_LIMIT: usize = 100;

#[async_trait]
pub trait InspectionStore: Send + Sync {
    /// Stores the inspection under a fresh id, stamped with the current time.
    async fn create(&self, inspection: NewInspection) -> Result<InspectionRecord, AppError>;

    /// Newest first, at most `limit` records.
    async fn list(&self, limit: usize) -> Result<Vec<InspectionRecord>, AppError>;

    async fn stats(&self) -> Result<InspectionStats, AppError>;

    /// Fails with [`AppError::NotFound`] when no record has this id.
    async fn delete_by_id(&self, id: &str) -> Result<(), AppError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns `false` without writing when the email is already taken.
    async fn insert(&self, user: &User) -> Result<bool, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

/// Timestamps are cut to whole microseconds so the redis timeline score, an
/// f64, holds them exactly.
pub fn stamp(inspection: NewInspection) -> InspectionRecord {
    let now = Utc::now();
    let now = DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now);

    inspection.into_record(Uuid::new_v4().to_string(), now)
}

pub fn not_found() -> AppError {
    AppError::NotFound("Inspection not found".to_string())
}
