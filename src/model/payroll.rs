use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, strum::Display)]
pub enum PayrollStatus {
    Calculated,
    Paid,
}

/// Shared (start, end, pay_date) row referenced by every payroll record
/// covering that range. Created lazily with the first record.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayrollPeriod {
    pub id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pay_date: NaiveDate,
    pub is_closed: bool,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayrollRecord {
    pub id: u64,
    pub employee_id: u64,
    pub period_id: u64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub allowances: f64,
    pub gross_pay: f64,
    pub deductions: f64,
    /// gross_pay - deductions at calculation time; stored, not recomputed.
    pub net_pay: f64,
    pub status: PayrollStatus,
    pub paid_date: Option<NaiveDate>,
}

/// Fixed line items under a payroll record: Basic Pay, Overtime Pay,
/// Deductions, Allowances. Zero-amount components are never inserted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayComponent {
    pub id: u64,
    pub payroll_id: u64,
    pub name: String,
    pub amount: f64,
}
