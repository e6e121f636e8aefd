use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::error::Result;

/// Singleton schedule configuration. Mutated only through the settings
/// screen; every attendance/payroll computation takes it as an input
/// rather than reading shared state.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkingHours {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub late_grace_minutes: i64,
    pub late_deduction_rate_per_hour: f64,
}

impl WorkingHours {
    pub async fn load(pool: &MySqlPool) -> Result<Self> {
        let wh = sqlx::query_as::<_, WorkingHours>(
            r#"
            SELECT start_time, end_time, late_grace_minutes, late_deduction_rate_per_hour
            FROM working_hours
            LIMIT 1
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(wh)
    }

    /// Length of one standard shift in fractional hours. An end time at or
    /// before the start time means the shift crosses midnight.
    pub fn standard_hours_per_day(&self) -> f64 {
        let mut span = self.end_time - self.start_time;
        if span <= Duration::zero() {
            span = span + Duration::hours(24);
        }
        span.num_seconds() as f64 / 3600.0
    }

    /// When the shift that started on `date` is scheduled to end.
    pub fn shift_end_for(&self, date: NaiveDate) -> NaiveDateTime {
        if self.end_time <= self.start_time {
            (date + Duration::days(1)).and_time(self.end_time)
        } else {
            date.and_time(self.end_time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(start: (u32, u32), end: (u32, u32)) -> WorkingHours {
        WorkingHours {
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            late_grace_minutes: 15,
            late_deduction_rate_per_hour: 100.0,
        }
    }

    #[test]
    fn standard_day_span() {
        assert_eq!(hours((9, 0), (17, 0)).standard_hours_per_day(), 8.0);
        assert_eq!(hours((9, 0), (17, 30)).standard_hours_per_day(), 8.5);
    }

    #[test]
    fn overnight_span_wraps_past_midnight() {
        assert_eq!(hours((22, 0), (6, 0)).standard_hours_per_day(), 8.0);
    }

    #[test]
    fn shift_end_lands_on_next_day_for_overnight() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let wh = hours((22, 0), (6, 0));
        assert_eq!(
            wh.shift_end_for(date),
            NaiveDate::from_ymd_opt(2026, 3, 11)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap()
        );

        let wh = hours((9, 0), (17, 0));
        assert_eq!(wh.shift_end_for(date), date.and_hms_opt(17, 0, 0).unwrap());
    }
}
