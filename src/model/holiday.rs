use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Holiday {
    pub id: u64,
    pub holiday_date: NaiveDate,
    pub event_name: String,
}
