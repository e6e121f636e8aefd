use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, strum::Display)]
pub enum OvertimeStatus {
    Pending,
    Approved,
    Rejected,
}

/// Rate class for approved overtime, e.g. "Regular" at 1.5 or "Holiday"
/// at 2.0. The multiplier scales the payroll run's derived hourly rate.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OvertimeType {
    pub id: u64,
    pub name: String,
    pub multiplier: f64,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OvertimeRequest {
    pub id: u64,
    pub employee_id: u64,
    pub ot_date: NaiveDate,
    pub hours: f64,
    pub ot_type_id: u64,
    pub status: OvertimeStatus,
}
