use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;

use crate::attendance::rules;
use crate::error::{Error, Result};
use crate::model::{AttendanceDaily, AttendanceLog, DayStatus, WorkingHours};

#[derive(Debug, Serialize)]
pub struct ClockInResult {
    pub clock_in: NaiveDateTime,
    /// Wall-clock time formatted for display, e.g. "09:02 AM".
    pub clock_in_display: String,
    pub is_late: bool,
    pub late_minutes: i64,
    pub status: DayStatus,
}

#[derive(Debug, Serialize)]
pub struct ClockOutResult {
    pub clock_out: NaiveDateTime,
    pub clock_out_display: String,
    pub hours_worked: f64,
    pub overtime_hrs: f64,
    pub is_half_day: bool,
    pub status: DayStatus,
}

async fn is_holiday(pool: &MySqlPool, date: NaiveDate) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM holidays WHERE holiday_date = ?",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

async fn has_approved_leave(pool: &MySqlPool, employee_id: u64, date: NaiveDate) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM leave_requests
        WHERE employee_id = ?
        AND status = 'Approved'
        AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Daily rows for one employee over a date range, oldest first. Reports and
/// the payslip renderer read attendance through this.
pub async fn daily_history(
    pool: &MySqlPool,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<AttendanceDaily>> {
    if start_date > end_date {
        return Err(Error::validation("start_date cannot be after end_date"));
    }

    let rows = sqlx::query_as::<_, AttendanceDaily>(
        r#"
        SELECT id, employee_id, work_date, status, hours_worked, overtime_hrs, late_minutes
        FROM attendance_daily
        WHERE employee_id = ? AND work_date BETWEEN ? AND ?
        ORDER BY work_date
        "#,
    )
    .bind(employee_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Record a clock-in for `employee_id` at the caller-supplied timestamp.
///
/// Check-then-act: the "no existing log" test and the insert are separate
/// statements, so two simultaneous calls for the same employee can both pass
/// the check. The unique key on (employee_id, work_date) is the backstop.
pub async fn clock_in(
    pool: &MySqlPool,
    wh: &WorkingHours,
    employee_id: u64,
    now: NaiveDateTime,
) -> Result<ClockInResult> {
    if employee_id == 0 {
        return Err(Error::validation("Invalid employee id"));
    }
    let date = now.date();

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance_logs WHERE employee_id = ? AND work_date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(pool)
    .await?;
    if existing > 0 {
        return Err(Error::precondition("Already clocked in today"));
    }

    if is_holiday(pool, date).await? {
        return Err(Error::precondition("Cannot clock in on a holiday"));
    }
    if has_approved_leave(pool, employee_id, date).await? {
        return Err(Error::precondition("Cannot clock in while on approved leave"));
    }

    let decision = rules::evaluate_clock_in(wh, now)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO attendance_logs (employee_id, work_date, clock_in) VALUES (?, ?, ?)",
    )
    .bind(employee_id)
    .bind(date)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let daily_id = sqlx::query_scalar::<_, u64>(
        "SELECT id FROM attendance_daily WHERE employee_id = ? AND work_date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(&mut *tx)
    .await?;

    match daily_id {
        // Only status and late_minutes belong to clock-in; hours from an
        // earlier session on the same day must survive.
        Some(id) => {
            sqlx::query("UPDATE attendance_daily SET status = ?, late_minutes = ? WHERE id = ?")
                .bind(decision.status)
                .bind(decision.late_minutes)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO attendance_daily
                (employee_id, work_date, status, hours_worked, overtime_hrs, late_minutes)
                VALUES (?, ?, ?, 0, 0, ?)
                "#,
            )
            .bind(employee_id)
            .bind(date)
            .bind(decision.status)
            .bind(decision.late_minutes)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    info!(
        employee_id,
        status = %decision.status,
        late_minutes = decision.late_minutes,
        "Clock-in recorded"
    );

    Ok(ClockInResult {
        clock_in: now,
        clock_in_display: now.format("%I:%M %p").to_string(),
        is_late: decision.status == DayStatus::Late,
        late_minutes: decision.late_minutes,
        status: decision.status,
    })
}

/// Close the open log for the day and settle worked/overtime hours.
pub async fn clock_out(
    pool: &MySqlPool,
    wh: &WorkingHours,
    employee_id: u64,
    now: NaiveDateTime,
) -> Result<ClockOutResult> {
    if employee_id == 0 {
        return Err(Error::validation("Invalid employee id"));
    }
    let date = now.date();

    let open_log = sqlx::query_as::<_, AttendanceLog>(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out
        FROM attendance_logs
        WHERE employee_id = ? AND work_date = ? AND clock_out IS NULL
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        Error::precondition("No open clock-in found: clock in first, or you already clocked out")
    })?;

    let prior_status = sqlx::query_scalar::<_, Option<DayStatus>>(
        "SELECT status FROM attendance_daily WHERE employee_id = ? AND work_date = ?",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?
    .flatten();

    let decision = rules::evaluate_clock_out(wh, open_log.clock_in, now, prior_status)?;

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE attendance_logs SET clock_out = ? WHERE id = ?")
        .bind(now)
        .bind(open_log.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        UPDATE attendance_daily
        SET hours_worked = ?, overtime_hrs = ?, status = ?
        WHERE employee_id = ? AND work_date = ?
        "#,
    )
    .bind(decision.hours_worked)
    .bind(decision.overtime_hrs)
    .bind(decision.status)
    .bind(employee_id)
    .bind(date)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        employee_id,
        hours_worked = decision.hours_worked,
        overtime_hrs = decision.overtime_hrs,
        status = %decision.status,
        "Clock-out recorded"
    );

    Ok(ClockOutResult {
        clock_out: now,
        clock_out_display: now.format("%I:%M %p").to_string(),
        hours_worked: decision.hours_worked,
        overtime_hrs: decision.overtime_hrs,
        is_half_day: decision.is_half_day,
        status: decision.status,
    })
}
