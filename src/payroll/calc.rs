//! Pure payroll math over aggregates the service layer has already fetched.
//! No side effects: the caller reviews the breakdown before committing it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::WorkingHours;

/// Attendance sums for one employee over the payroll period.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceTotals {
    pub regular_hours: f64,
    pub late_minutes: i64,
    /// Days with status Present or Late.
    pub present_days: i64,
}

/// Approved overtime hours sharing one type multiplier.
#[derive(Debug, Clone, Copy)]
pub struct OvertimeGroup {
    pub hours: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayrollBreakdown {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
    pub standard_hours_per_day: f64,
    pub derived_hourly_rate: f64,
    pub regular_hours: f64,
    pub present_days: i64,
    pub late_minutes: i64,
    pub overtime_hours: f64,
    pub basic_pay: f64,
    pub overtime_pay: f64,
    pub late_deductions: f64,
    pub allowances: f64,
    pub gross_pay: f64,
    pub net_pay: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PayrollBreakdown {
    /// Presentation copy with money fields rounded to 2 decimals. The
    /// unrounded breakdown stays authoritative for any further arithmetic.
    pub fn rounded(&self) -> Self {
        Self {
            derived_hourly_rate: round2(self.derived_hourly_rate),
            basic_pay: round2(self.basic_pay),
            overtime_pay: round2(self.overtime_pay),
            late_deductions: round2(self.late_deductions),
            allowances: round2(self.allowances),
            gross_pay: round2(self.gross_pay),
            net_pay: round2(self.net_pay),
            ..self.clone()
        }
    }
}

/// Spread the monthly salary across the period's calendar days and standard
/// daily hours, then price regular hours, overtime (per type multiplier),
/// and late-minute deductions against that derived rate.
pub fn compute(
    salary_monthly: f64,
    wh: &WorkingHours,
    start_date: NaiveDate,
    end_date: NaiveDate,
    totals: AttendanceTotals,
    overtime: &[OvertimeGroup],
    allowances: f64,
) -> Result<PayrollBreakdown> {
    if start_date > end_date {
        return Err(Error::validation("start_date cannot be after end_date"));
    }
    if salary_monthly < 0.0 {
        return Err(Error::validation("Monthly salary cannot be negative"));
    }
    if allowances < 0.0 {
        return Err(Error::validation("Allowances cannot be negative"));
    }

    let total_days = (end_date - start_date).num_days() + 1;
    let standard_hours_per_day = wh.standard_hours_per_day();
    let derived_hourly_rate = salary_monthly / (total_days as f64 * standard_hours_per_day);

    let basic_pay = totals.regular_hours * derived_hourly_rate;

    let mut overtime_pay = 0.0;
    let mut overtime_hours = 0.0;
    for group in overtime {
        overtime_pay += group.hours * derived_hourly_rate * group.multiplier;
        overtime_hours += group.hours;
    }

    let late_deductions =
        (totals.late_minutes as f64 / 60.0) * wh.late_deduction_rate_per_hour;

    let gross_pay = basic_pay + overtime_pay + allowances;
    let net_pay = gross_pay - late_deductions;

    Ok(PayrollBreakdown {
        start_date,
        end_date,
        total_days,
        standard_hours_per_day,
        derived_hourly_rate,
        regular_hours: totals.regular_hours,
        present_days: totals.present_days,
        late_minutes: totals.late_minutes,
        overtime_hours,
        basic_pay,
        overtime_pay,
        late_deductions,
        allowances,
        gross_pay,
        net_pay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn nine_to_five(deduction_rate: f64) -> WorkingHours {
        WorkingHours {
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            late_grace_minutes: 15,
            late_deduction_rate_per_hour: deduction_rate,
        }
    }

    fn june() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        )
    }

    #[test]
    fn thirty_day_month_with_overtime() {
        // 20,000 monthly over 30 days of 8h -> 83.33/h; 160h regular plus
        // 10h at 1.5x.
        let (start, end) = june();
        let totals = AttendanceTotals {
            regular_hours: 160.0,
            late_minutes: 0,
            present_days: 20,
        };
        let overtime = [OvertimeGroup {
            hours: 10.0,
            multiplier: 1.5,
        }];

        let breakdown = compute(20_000.0, &nine_to_five(100.0), start, end, totals, &overtime, 0.0)
            .unwrap()
            .rounded();

        assert_eq!(breakdown.total_days, 30);
        assert_eq!(breakdown.standard_hours_per_day, 8.0);
        assert_eq!(breakdown.derived_hourly_rate, 83.33);
        assert_eq!(breakdown.basic_pay, 13_333.33);
        assert_eq!(breakdown.overtime_pay, 1_250.0);
        assert_eq!(breakdown.overtime_hours, 10.0);
        assert_eq!(breakdown.gross_pay, 14_583.33);
        assert_eq!(breakdown.net_pay, 14_583.33);
    }

    #[test]
    fn late_minutes_are_priced_per_hour() {
        let (start, end) = june();
        let totals = AttendanceTotals {
            regular_hours: 80.0,
            late_minutes: 90,
            present_days: 10,
        };

        let breakdown =
            compute(24_000.0, &nine_to_five(50.0), start, end, totals, &[], 0.0).unwrap();

        // 90 minutes at 50/h
        assert_eq!(breakdown.late_deductions, 75.0);
        assert_eq!(breakdown.net_pay, breakdown.gross_pay - 75.0);
    }

    #[test]
    fn allowances_enter_gross_but_not_deductions() {
        let (start, end) = june();
        let totals = AttendanceTotals {
            regular_hours: 160.0,
            ..Default::default()
        };

        let with = compute(20_000.0, &nine_to_five(100.0), start, end, totals, &[], 500.0).unwrap();
        let without =
            compute(20_000.0, &nine_to_five(100.0), start, end, totals, &[], 0.0).unwrap();

        assert_eq!(with.gross_pay, without.gross_pay + 500.0);
        assert_eq!(with.net_pay, without.net_pay + 500.0);
    }

    #[test]
    fn multiple_overtime_types_accumulate() {
        let (start, end) = june();
        let overtime = [
            OvertimeGroup {
                hours: 4.0,
                multiplier: 1.5,
            },
            OvertimeGroup {
                hours: 2.0,
                multiplier: 2.0,
            },
        ];

        let breakdown = compute(
            20_000.0,
            &nine_to_five(100.0),
            start,
            end,
            AttendanceTotals::default(),
            &overtime,
            0.0,
        )
        .unwrap();

        assert_eq!(breakdown.overtime_hours, 6.0);
        let rate = breakdown.derived_hourly_rate;
        assert!((breakdown.overtime_pay - (4.0 * rate * 1.5 + 2.0 * rate * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let (start, end) = june();
        let totals = AttendanceTotals {
            regular_hours: 152.5,
            late_minutes: 37,
            present_days: 19,
        };
        let overtime = [OvertimeGroup {
            hours: 3.25,
            multiplier: 1.5,
        }];

        let a = compute(31_750.0, &nine_to_five(120.0), start, end, totals, &overtime, 250.0)
            .unwrap();
        let b = compute(31_750.0, &nine_to_five(120.0), start, end, totals, &overtime, 250.0)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.rounded(), b.rounded());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let (start, end) = june();
        let err = compute(
            20_000.0,
            &nine_to_five(100.0),
            end,
            start,
            AttendanceTotals::default(),
            &[],
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn zero_attendance_produces_zero_pay() {
        let (start, end) = june();
        let breakdown = compute(
            20_000.0,
            &nine_to_five(100.0),
            start,
            end,
            AttendanceTotals::default(),
            &[],
            0.0,
        )
        .unwrap();

        assert_eq!(breakdown.basic_pay, 0.0);
        assert_eq!(breakdown.gross_pay, 0.0);
        assert_eq!(breakdown.net_pay, 0.0);
        // The rate itself is still derived from the salary.
        assert!(breakdown.derived_hourly_rate > 0.0);
    }
}
