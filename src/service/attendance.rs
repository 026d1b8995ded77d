use chrono::{DateTime, FixedOffset, NaiveDate, SubsecRound, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::attendance::{
        AttendanceRecord, DayState, NewAttendance, ReportEntry, ReportFilter, UpdateAttendance,
    },
    service::policy,
    store::{AttendanceStore, StoreError},
    utils::clock::Clock,
};

/// Outcome of a check-in or check-out: the record plus a line for the user.
#[derive(Debug)]
pub struct Stamped {
    pub record: AttendanceRecord,
    pub message: String,
}

/// Check-in/check-out state machine per (user, date):
/// `NotCheckedIn -> CheckedIn -> CheckedOut`.
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    zone: FixedOffset,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>, zone: FixedOffset) -> Self {
        Self { store, clock, zone }
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Current instant at the millisecond precision the store keeps.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    /// Calendar date in the service timezone, read from the clock on every call.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.zone).date_naive()
    }

    fn local_clock_time(&self, at: DateTime<Utc>) -> String {
        format!(
            "{} (UTC{})",
            at.with_timezone(&self.zone).format("%H:%M:%S"),
            self.zone
        )
    }

    pub async fn check_in(&self, who: &AuthUser) -> AppResult<Stamped> {
        let now = self.now();
        let today = now.with_timezone(&self.zone).date_naive();

        if self.store.find_for_day(who.user_id, today).await?.is_some() {
            return Err(AppError::AlreadyCheckedIn);
        }

        let record = self
            .store
            .insert(NewAttendance {
                user_id: who.user_id,
                date: today,
                check_in_time: now,
            })
            .await
            .map_err(|e| match e {
                // lost the race against a concurrent check-in
                StoreError::Duplicate => AppError::AlreadyCheckedIn,
                other => other.into(),
            })?;

        info!(user_id = who.user_id, record_id = record.id, %today, "Checked in");

        Ok(Stamped {
            message: format!(
                "Hello {}, your check-in was recorded at {}",
                who.nama,
                self.local_clock_time(now)
            ),
            record,
        })
    }

    pub async fn check_out(&self, who: &AuthUser) -> AppResult<Stamped> {
        let now = self.now();
        let today = now.with_timezone(&self.zone).date_naive();

        let mut record = match self.store.find_for_day(who.user_id, today).await? {
            Some(r) if r.is_open() => r,
            _ => return Err(AppError::NoActiveCheckIn),
        };

        let out = now.max(record.check_in_time);
        if !self.store.close(record.id, out).await? {
            return Err(AppError::NoActiveCheckIn);
        }
        record.check_out_time = Some(out);

        info!(user_id = who.user_id, record_id = record.id, %today, "Checked out");

        Ok(Stamped {
            message: format!(
                "Goodbye {}, your check-out was recorded at {}",
                who.nama,
                self.local_clock_time(out)
            ),
            record,
        })
    }

    pub async fn today_state(
        &self,
        who: &AuthUser,
    ) -> AppResult<(NaiveDate, DayState, Option<AttendanceRecord>)> {
        let today = self.today();
        let record = self.store.find_for_day(who.user_id, today).await?;
        Ok((today, DayState::of(record.as_ref()), record))
    }

    pub async fn find(&self, who: &AuthUser, id: u64) -> AppResult<AttendanceRecord> {
        let record = self.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        policy::authorize_record(who, &record)?;
        Ok(record)
    }

    /// Applies only the keys present in `changes`. An explicit null check-out
    /// reopens the record; an explicit null check-in is refused.
    pub async fn update(
        &self,
        who: &AuthUser,
        id: u64,
        changes: UpdateAttendance,
    ) -> AppResult<AttendanceRecord> {
        if changes.is_empty() {
            return Err(AppError::invalid(
                "Request body must contain checkInTime or checkOutTime",
            ));
        }

        let mut record = self.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        if let Err(e) = policy::authorize_record(who, &record) {
            warn!(user_id = who.user_id, record_id = id, "Update refused");
            return Err(e);
        }

        match changes.check_in_time {
            Some(Some(t)) => record.check_in_time = t.trunc_subsecs(3),
            Some(None) => return Err(AppError::invalid("checkInTime cannot be cleared")),
            None => {}
        }
        if let Some(out) = changes.check_out_time {
            record.check_out_time = out.map(|t| t.trunc_subsecs(3));
        }

        if record.check_out_time.is_some_and(|out| out < record.check_in_time) {
            return Err(AppError::invalid("checkOutTime must not be before checkInTime"));
        }

        if !self.store.save_times(&record).await? {
            return Err(AppError::NotFound);
        }

        info!(user_id = who.user_id, record_id = id, "Attendance record updated");
        Ok(record)
    }

    pub async fn delete(&self, who: &AuthUser, id: u64) -> AppResult<()> {
        let record = self.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        if let Err(e) = policy::authorize_record(who, &record) {
            warn!(user_id = who.user_id, record_id = id, "Delete refused");
            return Err(e);
        }

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound);
        }

        info!(user_id = who.user_id, record_id = id, "Attendance record deleted");
        Ok(())
    }

    /// Admin listing. With no dates at all the report covers today only.
    pub async fn report(
        &self,
        who: &AuthUser,
        nama: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<(ReportFilter, Vec<ReportEntry>)> {
        policy::require_admin(who)?;

        let (start_date, end_date) = match (start_date, end_date) {
            (None, None) => {
                let today = self.today();
                (Some(today), Some(today))
            }
            (Some(start), Some(end)) if start > end => {
                return Err(AppError::invalid("startDate cannot be after endDate"));
            }
            bounds => bounds,
        };

        let filter = ReportFilter {
            nama: nama.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            start_date,
            end_date,
        };

        let entries = self.store.report(&filter).await?;
        Ok((filter, entries))
    }
}
