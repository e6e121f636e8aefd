use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: u64,
    pub position_id: u64,

    /// Login identity this employee is linked to, if any.
    pub user_id: Option<u64>,

    pub salary_monthly: f64,
    /// Nominal rate kept on file; payroll recomputes its own derived rate.
    pub hourly_rate: f64,

    pub hire_date: NaiveDate,
    pub status: String,
}
