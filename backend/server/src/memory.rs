//! In-process stores, selected with `REDIS_URL=memory://`. Nothing survives a restart.
use std::collections::{HashMap, hash_map::Entry};

use async_trait::async_trait;
use readings::{InspectionRecord, InspectionStats, NewInspection, Status};
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    store::{InspectionStore, User, UserStore, not_found, stamp},
};

/// Records kept in insertion order, so the tail is always the newest.
#[derive(Default)]
pub struct MemoryInspectionStore {
    records: RwLock<Vec<InspectionRecord>>,
}

impl MemoryInspectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InspectionStore for MemoryInspectionStore {
    async fn create(&self, inspection: NewInspection) -> Result<InspectionRecord, AppError> {
        let record = stamp(inspection);
        self.records.write().await.push(record.clone());

        Ok(record)
    }

    async fn list(&self, limit: usize) -> Result<Vec<InspectionRecord>, AppError> {
        let records = self.records.read().await;

        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn stats(&self) -> Result<InspectionStats, AppError> {
        let records = self.records.read().await;
        let passed = records
            .iter()
            .filter(|r| r.status == Status::Passed)
            .count() as u64;
        let sealed = records.iter().filter(|r| r.is_sealed).count() as u64;
        let total = records.len() as u64;

        Ok(InspectionStats {
            total_packages: total,
            passed_packages: passed,
            rejected_packages: total - passed,
            sealed_packages: sealed,
            unsealed_packages: total - sealed,
        })
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(not_found)?;
        records.remove(index);

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<bool, AppError> {
        match self.users.write().await.entry(user.email.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
