use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{AttendanceStore, StoreError, StoreResult, UserStore};
use crate::model::attendance::{AttendanceRecord, NewAttendance, ReportEntry, ReportFilter};
use crate::model::user::{NewUser, User};

/// Mutex-guarded tables with the same key rules as the MySQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    records: BTreeMap<u64, AttendanceRecord>,
    next_user_id: u64,
    next_record_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".into()))
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self.tables()?.records.get(&id).cloned())
    }

    async fn find_for_day(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let tables = self.tables()?;
        Ok(tables
            .records
            .values()
            .find(|r| r.user_id == user_id && r.date == date)
            .cloned())
    }

    async fn insert(&self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        let mut tables = self.tables()?;

        if tables
            .records
            .values()
            .any(|r| r.user_id == new.user_id && r.date == new.date)
        {
            return Err(StoreError::Duplicate);
        }
        if !tables.users.contains_key(&new.user_id) {
            return Err(StoreError::Backend(format!(
                "foreign key violation: user {} does not exist",
                new.user_id
            )));
        }

        tables.next_record_id += 1;
        let record = AttendanceRecord {
            id: tables.next_record_id,
            user_id: new.user_id,
            date: new.date,
            check_in_time: new.check_in_time,
            check_out_time: None,
        };
        tables.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn close(&self, id: u64, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut tables = self.tables()?;
        match tables.records.get_mut(&id) {
            Some(record) if record.is_open() => {
                record.check_out_time = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_times(&self, record: &AttendanceRecord) -> StoreResult<bool> {
        let mut tables = self.tables()?;
        match tables.records.get_mut(&record.id) {
            Some(stored) => {
                stored.check_in_time = record.check_in_time;
                stored.check_out_time = record.check_out_time;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        Ok(self.tables()?.records.remove(&id).is_some())
    }

    async fn report(&self, filter: &ReportFilter) -> StoreResult<Vec<ReportEntry>> {
        let tables = self.tables()?;

        let mut entries: Vec<ReportEntry> = tables
            .records
            .values()
            .filter_map(|r| {
                let owner = tables.users.get(&r.user_id)?;
                filter.matches(&owner.nama, r.date).then(|| ReportEntry {
                    id: r.id,
                    user_id: r.user_id,
                    nama: owner.nama.clone(),
                    date: r.date,
                    check_in_time: r.check_in_time,
                    check_out_time: r.check_out_time,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.check_in_time.cmp(&a.check_in_time))
        });
        Ok(entries)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tables = self.tables()?;

        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate);
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            nama: new.nama,
            email: new.email,
            password: new.password_hash,
            role: new.role,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let mut tables = self.tables()?;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE CASCADE
        tables.records.retain(|_, r| r.user_id != id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn new_user(nama: &str, email: &str) -> NewUser {
        NewUser {
            nama: nama.into(),
            email: email.into(),
            password_hash: "x".into(),
            role: Role::Mahasiswa,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[actix_web::test]
    async fn rejects_second_record_for_same_day() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("Rina", "rina@kampus.ac.id")).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        store
            .insert(NewAttendance { user_id: user.id, date, check_in_time: at("2026-01-05T01:00:00Z") })
            .await
            .unwrap();
        let second = store
            .insert(NewAttendance { user_id: user.id, date, check_in_time: at("2026-01-05T02:00:00Z") })
            .await;

        assert!(matches!(second, Err(StoreError::Duplicate)));
    }

    #[actix_web::test]
    async fn close_only_applies_once() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("Rina", "rina@kampus.ac.id")).await.unwrap();
        let record = store
            .insert(NewAttendance {
                user_id: user.id,
                date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                check_in_time: at("2026-01-05T01:00:00Z"),
            })
            .await
            .unwrap();

        assert!(store.close(record.id, at("2026-01-05T09:00:00Z")).await.unwrap());
        assert!(!store.close(record.id, at("2026-01-05T10:00:00Z")).await.unwrap());

        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.check_out_time, Some(at("2026-01-05T09:00:00Z")));
    }

    #[actix_web::test]
    async fn deleting_user_cascades_to_records() {
        let store = MemoryStore::new();
        let rina = store.create_user(new_user("Rina", "rina@kampus.ac.id")).await.unwrap();
        let budi = store.create_user(new_user("Budi", "budi@kampus.ac.id")).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        for id in [rina.id, budi.id] {
            store
                .insert(NewAttendance { user_id: id, date, check_in_time: at("2026-01-05T01:00:00Z") })
                .await
                .unwrap();
        }

        assert!(store.delete_user(rina.id).await.unwrap());

        let left = store.report(&ReportFilter::default()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].nama, "Budi");
    }

    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("Rina", "rina@kampus.ac.id")).await.unwrap();
        let again = store.create_user(new_user("Rina B", "rina@kampus.ac.id")).await;
        assert!(matches!(again, Err(StoreError::Duplicate)));
    }
}
