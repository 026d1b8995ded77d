use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use tracing::debug;

use super::{AttendanceStore, StoreError, StoreResult, UserStore};
use crate::model::attendance::{AttendanceRecord, NewAttendance, ReportEntry, ReportFilter};
use crate::model::user::{NewUser, User, UserSql};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Backend(e.to_string())
    }
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Date(NaiveDate),
    Str(&'a str),
}

const RECORD_COLUMNS: &str = "id, user_id, date, check_in_time, check_out_time";

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM presensi WHERE id = ?");
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_for_day(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM presensi WHERE user_id = ? AND date = ?");
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn insert(&self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO presensi (user_id, date, check_in_time)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.date)
        .bind(new.check_in_time)
        .execute(&self.pool)
        .await?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            user_id: new.user_id,
            date: new.date,
            check_in_time: new.check_in_time,
            check_out_time: None,
        })
    }

    async fn close(&self, id: u64, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE presensi
            SET check_out_time = ?
            WHERE id = ?
            AND check_out_time IS NULL
            "#,
        )
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_times(&self, record: &AttendanceRecord) -> StoreResult<bool> {
        // MySQL reports 0 affected rows when nothing changed, so existence is
        // checked separately rather than trusting rows_affected.
        sqlx::query("UPDATE presensi SET check_in_time = ?, check_out_time = ? WHERE id = ?")
            .bind(record.check_in_time)
            .bind(record.check_out_time)
            .bind(record.id)
            .execute(&self.pool)
            .await?;

        Ok(self.find_by_id(record.id).await?.is_some())
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM presensi WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn report(&self, filter: &ReportFilter) -> StoreResult<Vec<ReportEntry>> {
        let like = filter.like_pattern();
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(start) = filter.start_date {
            where_sql.push_str(" AND p.date >= ?");
            args.push(FilterValue::Date(start));
        }

        if let Some(end) = filter.end_date {
            where_sql.push_str(" AND p.date <= ?");
            args.push(FilterValue::Date(end));
        }

        if let Some(like) = like.as_deref() {
            where_sql.push_str(" AND u.nama LIKE ? ESCAPE '!'");
            args.push(FilterValue::Str(like));
        }

        let data_sql = format!(
            r#"
            SELECT p.id, p.user_id, u.nama, p.date, p.check_in_time, p.check_out_time
            FROM presensi p
            JOIN users u ON u.id = p.user_id
            {}
            ORDER BY p.date DESC, p.check_in_time DESC
            "#,
            where_sql
        );
        debug!(sql = %data_sql, "Fetching attendance report");

        let mut data_q = sqlx::query_as::<_, ReportEntry>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::Date(d) => data_q.bind(d),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        Ok(data_q.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let result = sqlx::query(
            r#"INSERT INTO users (nama, email, password, role) VALUES (?, ?, ?, ?)"#,
        )
        .bind(&new.nama)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_id(),
            nama: new.nama,
            email: new.email,
            password: new.password_hash,
            role: new.role,
        })
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserSql>(
            r#"
            SELECT id, nama, email, password, CAST(role AS CHAR) AS role
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from)
            .transpose()
            .map_err(|e| StoreError::Backend(format!("bad role column: {e}")))
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
