//! # Redis
//!
//! Primary store for inspections and user accounts.
//!
//! ## Layout
//!
//! - `inspection:records`: hash, id to JSON record
//! - `inspection:timeline`: sorted set of ids scored by creation time (µs)
//! - `inspection:status:passed` / `inspection:status:rejected`: id sets
//! - `inspection:seal:sealed` / `inspection:seal:unsealed`: id sets
//! - `auth:users`: hash, lowercased email to JSON user
//!
//! ## Consistency
//!
//! - Create and delete each run as one MULTI/EXEC, so a record is never half indexed
//! - Statistics read the five cardinalities in one MULTI/EXEC, giving a single snapshot
//! - Records are never updated in place
use std::time::Duration;

use async_trait::async_trait;
use readings::{InspectionRecord, InspectionStats, NewInspection, Status};
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::{debug, info};

use crate::{
    error::AppError,
    store::{InspectionStore, User, UserStore, not_found, stamp},
};

pub const RECORDS_KEY: &str = "inspection:records";
pub const TIMELINE_KEY: &str = "inspection:timeline";
pub const PASSED_KEY: &str = "inspection:status:passed";
pub const REJECTED_KEY: &str = "inspection:status:rejected";
pub const SEALED_KEY: &str = "inspection:seal:sealed";
pub const UNSEALED_KEY: &str = "inspection:seal:unsealed";
pub const USERS_KEY: &str = "auth:users";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, AppError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    info!("Connected to redis");

    Ok(connection_manager)
}

fn status_key(status: Status) -> &'static str {
    match status {
        Status::Passed => PASSED_KEY,
        Status::Rejected => REJECTED_KEY,
    }
}

fn seal_key(is_sealed: bool) -> &'static str {
    if is_sealed { SEALED_KEY } else { UNSEALED_KEY }
}

#[derive(Clone)]
pub struct RedisInspectionStore {
    connection: ConnectionManager,
}

impl RedisInspectionStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl InspectionStore for RedisInspectionStore {
    async fn create(&self, inspection: NewInspection) -> Result<InspectionRecord, AppError> {
        let record = stamp(inspection);
        let json = serde_json::to_string(&record)?;
        let mut connection = self.connection.clone();

        redis::pipe()
            .atomic()
            .hset(RECORDS_KEY, &record.id, json)
            .ignore()
            .zadd(TIMELINE_KEY, &record.id, record.timestamp.timestamp_micros())
            .ignore()
            .sadd(status_key(record.status), &record.id)
            .ignore()
            .sadd(seal_key(record.is_sealed), &record.id)
            .ignore()
            .query_async::<()>(&mut connection)
            .await?;

        Ok(record)
    }

    async fn list(&self, limit: usize) -> Result<Vec<InspectionRecord>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut connection = self.connection.clone();
        let ids: Vec<String> = connection
            .zrevrange(TIMELINE_KEY, 0, limit as isize - 1)
            .await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let blobs: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(RECORDS_KEY)
            .arg(&ids)
            .query_async(&mut connection)
            .await?;

        // a concurrent delete may land between the two reads
        let mut records = Vec::with_capacity(blobs.len());
        for blob in blobs.into_iter().flatten() {
            records.push(serde_json::from_str(&blob)?);
        }

        debug!(count = records.len(), "Listed inspections");

        Ok(records)
    }

    async fn stats(&self) -> Result<InspectionStats, AppError> {
        let mut connection = self.connection.clone();

        let (total, passed, rejected, sealed, unsealed): (u64, u64, u64, u64, u64) = redis::pipe()
            .atomic()
            .hlen(RECORDS_KEY)
            .scard(PASSED_KEY)
            .scard(REJECTED_KEY)
            .scard(SEALED_KEY)
            .scard(UNSEALED_KEY)
            .query_async(&mut connection)
            .await?;

        Ok(InspectionStats {
            total_packages: total,
            passed_packages: passed,
            rejected_packages: rejected,
            sealed_packages: sealed,
            unsealed_packages: unsealed,
        })
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let mut connection = self.connection.clone();

        let (removed,): (u64,) = redis::pipe()
            .atomic()
            .hdel(RECORDS_KEY, id)
            .zrem(TIMELINE_KEY, id)
            .ignore()
            .srem(PASSED_KEY, id)
            .ignore()
            .srem(REJECTED_KEY, id)
            .ignore()
            .srem(SEALED_KEY, id)
            .ignore()
            .srem(UNSEALED_KEY, id)
            .ignore()
            .query_async(&mut connection)
            .await?;

        if removed == 0 {
            return Err(not_found());
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct RedisUserStore {
    connection: ConnectionManager,
}

impl RedisUserStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn insert(&self, user: &User) -> Result<bool, AppError> {
        let json = serde_json::to_string(user)?;
        let mut connection = self.connection.clone();

        let inserted: bool = connection.hset_nx(USERS_KEY, &user.email, json).await?;

        Ok(inserted)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut connection = self.connection.clone();
        let blob: Option<String> = connection.hget(USERS_KEY, email).await?;

        Ok(blob.map(|b| serde_json::from_str(&b)).transpose()?)
    }
}
