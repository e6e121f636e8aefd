use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{PayComponent, PayrollRecord, WorkingHours};
use crate::payroll::calc::{self, AttendanceTotals, OvertimeGroup, PayrollBreakdown};

#[derive(Debug, Deserialize)]
pub struct CreatePayroll {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub allowances: f64,
}

#[derive(Debug, Serialize)]
pub struct CreatedPayroll {
    pub payroll_id: u64,
    pub period_id: u64,
    pub breakdown: PayrollBreakdown,
}

async fn fetch_salary(pool: &MySqlPool, employee_id: u64) -> Result<f64> {
    sqlx::query_scalar::<_, f64>("SELECT salary_monthly FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::validation("Employee not found"))
}

async fn fetch_attendance_totals(
    pool: &MySqlPool,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<AttendanceTotals> {
    let (regular_hours, late_minutes, present_days) =
        sqlx::query_as::<_, (f64, i64, i64)>(
            r#"
            SELECT
                COALESCE(SUM(hours_worked), 0),
                CAST(COALESCE(SUM(late_minutes), 0) AS SIGNED),
                CAST(COALESCE(SUM(CASE WHEN status IN ('Present', 'Late') THEN 1 ELSE 0 END), 0) AS SIGNED)
            FROM attendance_daily
            WHERE employee_id = ? AND work_date BETWEEN ? AND ?
            "#,
        )
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(pool)
        .await?;

    Ok(AttendanceTotals {
        regular_hours,
        late_minutes,
        present_days,
    })
}

async fn fetch_overtime_groups(
    pool: &MySqlPool,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<OvertimeGroup>> {
    let rows = sqlx::query_as::<_, (f64, f64)>(
        r#"
        SELECT t.multiplier, SUM(r.hours)
        FROM overtime_requests r
        JOIN overtime_types t ON t.id = r.ot_type_id
        WHERE r.employee_id = ?
        AND r.status = 'Approved'
        AND r.ot_date BETWEEN ? AND ?
        GROUP BY t.id, t.multiplier
        "#,
    )
    .bind(employee_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(multiplier, hours)| OvertimeGroup { hours, multiplier })
        .collect())
}

/// Compute the payroll breakdown for review. Reads only; nothing is written
/// until the caller follows up with [`create_payroll`].
pub async fn calculate_payroll(
    pool: &MySqlPool,
    wh: &WorkingHours,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    allowances: f64,
) -> Result<PayrollBreakdown> {
    if employee_id == 0 {
        return Err(Error::validation("Invalid employee id"));
    }
    if start_date > end_date {
        return Err(Error::validation("start_date cannot be after end_date"));
    }

    let salary_monthly = fetch_salary(pool, employee_id).await?;
    let totals = fetch_attendance_totals(pool, employee_id, start_date, end_date).await?;
    let overtime = fetch_overtime_groups(pool, employee_id, start_date, end_date).await?;

    calc::compute(
        salary_monthly,
        wh,
        start_date,
        end_date,
        totals,
        &overtime,
        allowances,
    )
}

/// Persist a payroll record for the period, creating the shared
/// PayrollPeriod row on first use. One record per (employee, period).
pub async fn create_payroll(
    pool: &MySqlPool,
    wh: &WorkingHours,
    input: CreatePayroll,
) -> Result<CreatedPayroll> {
    let breakdown = calculate_payroll(
        pool,
        wh,
        input.employee_id,
        input.start_date,
        input.end_date,
        input.allowances,
    )
    .await?;

    let stored = breakdown.rounded();

    let mut tx = pool.begin().await?;

    let duplicate = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT r.id FROM payroll_records r
        JOIN payroll_periods p ON p.id = r.period_id
        WHERE r.employee_id = ? AND p.start_date = ? AND p.end_date = ?
        "#,
    )
    .bind(input.employee_id)
    .bind(input.start_date)
    .bind(input.end_date)
    .fetch_optional(&mut *tx)
    .await?;
    if duplicate.is_some() {
        return Err(Error::conflict(
            "Payroll already exists for this employee and period",
        ));
    }

    let period_id = match sqlx::query_scalar::<_, u64>(
        "SELECT id FROM payroll_periods WHERE start_date = ? AND end_date = ?",
    )
    .bind(input.start_date)
    .bind(input.end_date)
    .fetch_optional(&mut *tx)
    .await?
    {
        Some(id) => id,
        None => {
            let pay_date = input.end_date + Duration::days(7);
            let result = sqlx::query(
                r#"
                INSERT INTO payroll_periods (start_date, end_date, pay_date, is_closed)
                VALUES (?, ?, ?, 0)
                "#,
            )
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(pay_date)
            .execute(&mut *tx)
            .await?;
            result.last_insert_id()
        }
    };

    // net is re-derived from the stored (rounded) figures so the row keeps
    // net_pay = gross_pay - deductions exactly.
    let net_pay = stored.gross_pay - stored.late_deductions;

    let result = sqlx::query(
        r#"
        INSERT INTO payroll_records
        (employee_id, period_id, regular_hours, overtime_hours, allowances,
         gross_pay, deductions, net_pay, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'Calculated')
        "#,
    )
    .bind(input.employee_id)
    .bind(period_id)
    .bind(stored.regular_hours)
    .bind(stored.overtime_hours)
    .bind(stored.allowances)
    .bind(stored.gross_pay)
    .bind(stored.late_deductions)
    .bind(net_pay)
    .execute(&mut *tx)
    .await?;
    let payroll_id = result.last_insert_id();

    let components = [
        ("Basic Pay", stored.basic_pay),
        ("Overtime Pay", stored.overtime_pay),
        ("Deductions", stored.late_deductions),
        ("Allowances", stored.allowances),
    ];
    for (name, amount) in components {
        if amount == 0.0 {
            continue;
        }
        sqlx::query("INSERT INTO pay_components (payroll_id, name, amount) VALUES (?, ?, ?)")
            .bind(payroll_id)
            .bind(name)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(
        employee_id = input.employee_id,
        payroll_id,
        period_id,
        gross_pay = stored.gross_pay,
        net_pay,
        "Payroll record created"
    );

    Ok(CreatedPayroll {
        payroll_id,
        period_id,
        breakdown,
    })
}

/// Fetch a stored payroll record with its line items; this is the aggregate
/// the payslip renderer consumes.
pub async fn get_payroll(
    pool: &MySqlPool,
    payroll_id: u64,
) -> Result<Option<(PayrollRecord, Vec<PayComponent>)>> {
    let record = sqlx::query_as::<_, PayrollRecord>(
        r#"
        SELECT id, employee_id, period_id, regular_hours, overtime_hours, allowances,
               gross_pay, deductions, net_pay, status, paid_date
        FROM payroll_records
        WHERE id = ?
        "#,
    )
    .bind(payroll_id)
    .fetch_optional(pool)
    .await?;

    let Some(record) = record else {
        return Ok(None);
    };

    let components = sqlx::query_as::<_, PayComponent>(
        "SELECT id, payroll_id, name, amount FROM pay_components WHERE payroll_id = ?",
    )
    .bind(payroll_id)
    .fetch_all(pool)
    .await?;

    Ok(Some((record, components)))
}

/// Mark the given payroll records Paid as of `today`. Ids with no matching
/// row are silently ignored; the returned count covers matched rows only.
pub async fn process_payroll(
    pool: &MySqlPool,
    payroll_ids: &[u64],
    today: NaiveDate,
) -> Result<u64> {
    if payroll_ids.is_empty() {
        return Err(Error::validation("No payroll ids provided"));
    }

    let placeholders = vec!["?"; payroll_ids.len()].join(", ");
    let sql = format!(
        "UPDATE payroll_records SET status = 'Paid', paid_date = ? WHERE id IN ({placeholders})"
    );

    let mut query = sqlx::query(&sql).bind(today);
    for id in payroll_ids {
        query = query.bind(*id);
    }

    let result = query.execute(pool).await?;
    let affected = result.rows_affected();

    info!(requested = payroll_ids.len(), affected, "Payroll marked paid");

    Ok(affected)
}

/// Delete a payroll record with its components; an emptied parent period is
/// garbage-collected in the same transaction.
pub async fn delete_payroll(pool: &MySqlPool, payroll_id: u64) -> Result<()> {
    if payroll_id == 0 {
        return Err(Error::validation("Invalid payroll id"));
    }

    let mut tx = pool.begin().await?;

    let period_id = sqlx::query_scalar::<_, u64>(
        "SELECT period_id FROM payroll_records WHERE id = ?",
    )
    .bind(payroll_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| Error::validation("Payroll record not found"))?;

    sqlx::query("DELETE FROM pay_components WHERE payroll_id = ?")
        .bind(payroll_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM payroll_records WHERE id = ?")
        .bind(payroll_id)
        .execute(&mut *tx)
        .await?;

    let remaining = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM payroll_records WHERE period_id = ?",
    )
    .bind(period_id)
    .fetch_one(&mut *tx)
    .await?;

    if remaining == 0 {
        sqlx::query("DELETE FROM payroll_periods WHERE id = ?")
            .bind(period_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(payroll_id, period_id, period_deleted = remaining == 0, "Payroll record deleted");

    Ok(())
}
