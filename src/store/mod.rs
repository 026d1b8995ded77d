//! Persistence seams for attendance records and user accounts.
//!
//! The service only talks to these traits. `MySqlStore` backs the running
//! server, `MemoryStore` backs the test suite. Both enforce the one record
//! per (user, date) rule and report a violation as [`StoreError::Duplicate`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;

use crate::model::attendance::{AttendanceRecord, NewAttendance, ReportEntry, ReportFilter};
use crate::model::user::{NewUser, User};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[display(fmt = "duplicate key")]
    Duplicate,
    #[display(fmt = "{}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>>;

    async fn find_for_day(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Fails with [`StoreError::Duplicate`] when (user_id, date) already exists.
    async fn insert(&self, new: NewAttendance) -> StoreResult<AttendanceRecord>;

    /// Sets the check-out of a still open record. Returns false when the
    /// record is gone or was already closed.
    async fn close(&self, id: u64, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Overwrites both timestamps of an existing record.
    async fn save_times(&self, record: &AttendanceRecord) -> StoreResult<bool>;

    async fn delete(&self, id: u64) -> StoreResult<bool>;

    async fn report(&self, filter: &ReportFilter) -> StoreResult<Vec<ReportEntry>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Removes the account and, by cascade, all of its attendance records.
    async fn delete_user(&self, id: u64) -> StoreResult<bool>;
}
