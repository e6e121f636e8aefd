use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Daily attendance outcome. Stored as the literal column strings; the
/// variants are closed so an illegal status is unrepresentable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
pub enum DayStatus {
    Present,
    Late,
    #[sqlx(rename = "Half-Day")]
    #[strum(serialize = "Half-Day")]
    #[serde(rename = "Half-Day")]
    HalfDay,
    Absent,
    #[sqlx(rename = "On Leave")]
    #[strum(serialize = "On Leave")]
    #[serde(rename = "On Leave")]
    OnLeave,
    Holiday,
}

/// One row per clock-in event. At most one open row (clock_out NULL) per
/// employee per day; guarded by an existence check before insert, so two
/// near-simultaneous clock-ins for the same employee can still race.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceLog {
    pub id: u64,
    pub employee_id: u64,
    pub work_date: NaiveDate,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
}

/// One row per employee per work date. `status` is NULL between daily
/// generation and either a clock-in or the absence roll-up.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceDaily {
    pub id: u64,
    pub employee_id: u64,
    pub work_date: NaiveDate,
    pub status: Option<DayStatus>,
    pub hours_worked: f64,
    pub overtime_hrs: f64,
    pub late_minutes: i64,
}
