use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;

use crate::attendance::rules;
use crate::error::{Error, Result};
use crate::model::{DayStatus, WorkingHours};

/// Outcome of one `generate_attendance` run.
#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    /// Rows inserted by this run (includes the on-leave/holiday ones).
    pub generated: u64,
    pub on_leave: u64,
    pub holiday: u64,
    /// Active employees that already had a row for the date.
    pub already_exists: u64,
}

impl GenerationReport {
    fn record_insert(&mut self, status: Option<DayStatus>) {
        self.generated += 1;
        match status {
            Some(DayStatus::OnLeave) => self.on_leave += 1,
            Some(_) => self.holiday += 1,
            None => {}
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RollupReport {
    pub marked_absent: u64,
}

/// Seed an AttendanceDaily row for every active employee missing one on
/// `date`. Approved leave and holidays get their status up front; everyone
/// else stays unset until a clock-in or the absence roll-up resolves them.
/// Re-running for the same date inserts nothing.
pub async fn generate_attendance(pool: &MySqlPool, date: NaiveDate) -> Result<GenerationReport> {
    // Counted directly rather than derived from an active-employee total,
    // which could drift between statements.
    let already_exists = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM attendance_daily d
        JOIN employees e ON e.id = d.employee_id AND e.status = 'active'
        WHERE d.work_date = ?
        "#,
    )
    .bind(date)
    .fetch_one(pool)
    .await?;

    let missing: Vec<u64> = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT e.id FROM employees e
        WHERE e.status = 'active'
        AND NOT EXISTS (
            SELECT 1 FROM attendance_daily d
            WHERE d.employee_id = e.id AND d.work_date = ?
        )
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    let on_leave: HashSet<u64> = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT employee_id FROM leave_requests
        WHERE status = 'Approved'
        AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(date)
    .bind(date)
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    let holiday_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM holidays WHERE holiday_date = ?",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    let is_holiday = holiday_count > 0;

    let mut report = GenerationReport {
        already_exists: already_exists as u64,
        ..Default::default()
    };

    let mut tx = pool.begin().await?;

    for employee_id in missing {
        let status = rules::pending_day_status(on_leave.contains(&employee_id), is_holiday);
        report.record_insert(status);

        sqlx::query(
            r#"
            INSERT INTO attendance_daily
            (employee_id, work_date, status, hours_worked, overtime_hrs, late_minutes)
            VALUES (?, ?, ?, 0, 0, 0)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(status)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        %date,
        generated = report.generated,
        on_leave = report.on_leave,
        holiday = report.holiday,
        already_exists = report.already_exists,
        "Attendance generation finished"
    );

    Ok(report)
}

/// End-of-day absence roll-up: every row on `date` that is neither
/// On Leave/Holiday nor backed by a clock-in log flips to Absent.
pub async fn update_attendance_status(
    pool: &MySqlPool,
    wh: &WorkingHours,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<RollupReport> {
    rules::check_rollup_eligibility(wh, date, now)?;

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance_daily WHERE work_date = ?",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    if existing == 0 {
        return Err(Error::precondition(format!(
            "No attendance records for {date}: generate attendance first"
        )));
    }

    let result = sqlx::query(
        r#"
        UPDATE attendance_daily d
        SET d.status = 'Absent'
        WHERE d.work_date = ?
        AND (d.status IS NULL OR d.status NOT IN ('On Leave', 'Holiday'))
        AND NOT EXISTS (
            SELECT 1 FROM attendance_logs l
            WHERE l.employee_id = d.employee_id AND l.work_date = ?
        )
        "#,
    )
    .bind(date)
    .bind(date)
    .execute(pool)
    .await?;

    let marked_absent = result.rows_affected();
    info!(%date, marked_absent, "Absence roll-up finished");

    Ok(RollupReport { marked_absent })
}
