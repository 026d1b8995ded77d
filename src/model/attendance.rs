use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One row of the `presensi` table, unique per (user_id, date).
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }
}

pub struct NewAttendance {
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
}

/// Report row: a record joined with its owner's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportEntry {
    pub id: u64,
    pub user_id: u64,
    pub nama: String,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
}

/// Resolved report filter. Both bounds are inclusive; `None` leaves that side open.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub nama: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn matches(&self, nama: &str, date: NaiveDate) -> bool {
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        match &self.nama {
            Some(needle) => nama.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// `LIKE` pattern for the name filter, with `!` as the escape character so
    /// `%` and `_` in the input match literally.
    pub fn like_pattern(&self) -> Option<String> {
        self.nama.as_deref().map(|needle| {
            let mut pattern = String::with_capacity(needle.len() + 2);
            pattern.push('%');
            for c in needle.chars() {
                if matches!(c, '!' | '%' | '_') {
                    pattern.push('!');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

/// Partial update body for `PUT /attendance/{id}`.
///
/// The outer `Option` records whether the key was sent at all, the inner one
/// whether it was `null`. Only keys that were sent are applied.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendance {
    #[serde(default, deserialize_with = "present")]
    #[schema(example = "2026-01-05T08:00:00+07:00", format = "date-time", value_type = Option<String>)]
    pub check_in_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(example = "2026-01-05T16:00:00+07:00", format = "date-time", value_type = Option<String>)]
    pub check_out_time: Option<Option<DateTime<Utc>>>,
}

impl UpdateAttendance {
    pub fn is_empty(&self) -> bool {
        self.check_in_time.is_none() && self.check_out_time.is_none()
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Record as returned to clients, timestamps shown in the service timezone.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = 3)]
    pub user_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Rina")]
    pub nama: Option<String>,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-05T08:00:00+07:00", format = "date-time", value_type = String)]
    pub check_in_time: DateTime<FixedOffset>,
    #[schema(example = "2026-01-05T16:00:00+07:00", format = "date-time", value_type = Option<String>)]
    pub check_out_time: Option<DateTime<FixedOffset>>,
}

impl AttendanceView {
    pub fn localized(record: &AttendanceRecord, zone: FixedOffset) -> Self {
        AttendanceView {
            id: record.id,
            user_id: record.user_id,
            nama: None,
            date: record.date,
            check_in_time: record.check_in_time.with_timezone(&zone),
            check_out_time: record.check_out_time.map(|t| t.with_timezone(&zone)),
        }
    }

    pub fn with_nama(mut self, nama: impl Into<String>) -> Self {
        self.nama = Some(nama.into());
        self
    }

    pub fn from_report(entry: &ReportEntry, zone: FixedOffset) -> Self {
        AttendanceView {
            id: entry.id,
            user_id: entry.user_id,
            nama: Some(entry.nama.clone()),
            date: entry.date,
            check_in_time: entry.check_in_time.with_timezone(&zone),
            check_out_time: entry.check_out_time.map(|t| t.with_timezone(&zone)),
        }
    }
}

/// Where a user stands for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

impl DayState {
    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        match record {
            None => DayState::NotCheckedIn,
            Some(r) if r.is_open() => DayState::CheckedIn,
            Some(_) => DayState::CheckedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_distinguishes_null_from_absent() {
        let body: UpdateAttendance = serde_json::from_str(r#"{"checkOutTime": null}"#).unwrap();
        assert_eq!(body.check_out_time, Some(None));
        assert_eq!(body.check_in_time, None);
        assert!(!body.is_empty());

        let body: UpdateAttendance = serde_json::from_str("{}").unwrap();
        assert!(body.is_empty());

        let body: UpdateAttendance =
            serde_json::from_str(r#"{"checkInTime": "2026-01-05T08:00:00+07:00"}"#).unwrap();
        let expected = "2026-01-05T01:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(body.check_in_time, Some(Some(expected)));
    }

    #[test]
    fn report_filter_bounds_are_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
        let filter = ReportFilter {
            nama: Some("RIN".into()),
            start_date: Some(day(5)),
            end_date: Some(day(7)),
        };
        assert!(filter.matches("Rina", day(5)));
        assert!(filter.matches("Karina", day(7)));
        assert!(!filter.matches("Rina", day(8)));
        assert!(!filter.matches("Budi", day(6)));
    }

    #[test]
    fn name_filter_treats_wildcards_literally() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let filter = |n: &str| ReportFilter {
            nama: Some(n.into()),
            ..Default::default()
        };

        assert!(!filter("%").matches("Rina", day));
        assert!(!filter("_").matches("Rina", day));
        assert!(filter("%").matches("Rina 100%", day));

        assert_eq!(filter("50%_a!").like_pattern().as_deref(), Some("%50!%!_a!!%"));
        assert_eq!(filter("rin").like_pattern().as_deref(), Some("%rin%"));
        assert_eq!(ReportFilter::default().like_pattern(), None);
    }
}
