//! Pure clock-in/clock-out/roll-up decisions. No I/O: callers supply the
//! schedule and the current timestamp, which keeps every rule testable.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Error, Result};
use crate::model::{DayStatus, WorkingHours};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockInDecision {
    pub status: DayStatus,
    pub late_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockOutDecision {
    pub hours_worked: f64,
    pub overtime_hrs: f64,
    pub is_half_day: bool,
    pub status: DayStatus,
}

/// Classify a clock-in against the configured window.
///
/// Inside the grace period the day stays Present with zero late minutes;
/// past it the day is Late and the overshoot is rounded up to whole minutes.
pub fn evaluate_clock_in(wh: &WorkingHours, now: NaiveDateTime) -> Result<ClockInDecision> {
    let date = now.date();
    let expected_start = date.and_time(wh.start_time);
    let expected_end = date.and_time(wh.end_time);
    let grace_end = expected_start + Duration::minutes(wh.late_grace_minutes);

    if now < expected_start {
        return Err(Error::precondition(format!(
            "Too early to clock in: shift starts at {}",
            wh.start_time.format("%H:%M")
        )));
    }
    if now > expected_end {
        return Err(Error::precondition(format!(
            "Too late to clock in: shift ended at {}",
            wh.end_time.format("%H:%M")
        )));
    }

    if now <= grace_end {
        Ok(ClockInDecision {
            status: DayStatus::Present,
            late_minutes: 0,
        })
    } else {
        let seconds_past = (now - grace_end).num_seconds();
        Ok(ClockInDecision {
            status: DayStatus::Late,
            late_minutes: (seconds_past + 59) / 60,
        })
    }
}

/// Derive worked/overtime hours and the final day status for a clock-out.
///
/// Overtime only accrues past the scheduled end and never exceeds the hours
/// actually worked. A clock-out in the 12:00 minute forces Half-Day; any
/// other time keeps the status the clock-in already established.
pub fn evaluate_clock_out(
    wh: &WorkingHours,
    clock_in: NaiveDateTime,
    now: NaiveDateTime,
    prior_status: Option<DayStatus>,
) -> Result<ClockOutDecision> {
    if now < clock_in {
        return Err(Error::validation("Clock-out time is before clock-in time"));
    }

    let hours_worked = (now - clock_in).num_seconds() as f64 / 3600.0;

    let scheduled_end = now.date().and_time(wh.end_time);
    let overtime_hrs = if now > scheduled_end {
        let past_end = (now - scheduled_end).num_seconds() as f64 / 3600.0;
        past_end.min(hours_worked)
    } else {
        0.0
    };

    let is_half_day = now.hour() == 12 && now.minute() == 0;
    let status = if is_half_day {
        DayStatus::HalfDay
    } else {
        prior_status.unwrap_or(DayStatus::Present)
    };

    Ok(ClockOutDecision {
        hours_worked,
        overtime_hrs,
        is_half_day,
        status,
    })
}

/// Status to seed during daily generation, before any clock-in. Approved
/// leave wins over a holiday; an ordinary day stays unset until the roll-up.
pub fn pending_day_status(on_leave: bool, is_holiday: bool) -> Option<DayStatus> {
    if on_leave {
        Some(DayStatus::OnLeave)
    } else if is_holiday {
        Some(DayStatus::Holiday)
    } else {
        None
    }
}

/// The absence roll-up may only run once the shift that started on `date`
/// has ended (overnight shifts end on the following day).
pub fn check_rollup_eligibility(
    wh: &WorkingHours,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<()> {
    let shift_end = wh.shift_end_for(date);
    if now < shift_end {
        let remaining = ((shift_end - now).num_seconds() + 59) / 60;
        return Err(Error::precondition(format!(
            "Work day is still ongoing, {remaining} minutes remaining until {}",
            shift_end.format("%H:%M")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn standard_hours() -> WorkingHours {
        WorkingHours {
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            late_grace_minutes: 15,
            late_deduction_rate_per_hour: 100.0,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn clock_in_before_shift_start_is_rejected() {
        let err = evaluate_clock_in(&standard_hours(), at(8, 59, 59)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(err.to_string().contains("Too early"));
    }

    #[test]
    fn clock_in_after_shift_end_is_rejected() {
        let err = evaluate_clock_in(&standard_hours(), at(17, 0, 1)).unwrap_err();
        assert!(err.to_string().contains("Too late"));
    }

    #[test]
    fn clock_in_at_grace_end_is_still_present() {
        let decision = evaluate_clock_in(&standard_hours(), at(9, 15, 0)).unwrap();
        assert_eq!(decision.status, DayStatus::Present);
        assert_eq!(decision.late_minutes, 0);
    }

    #[test]
    fn one_second_past_grace_counts_as_one_late_minute() {
        let decision = evaluate_clock_in(&standard_hours(), at(9, 15, 1)).unwrap();
        assert_eq!(decision.status, DayStatus::Late);
        assert_eq!(decision.late_minutes, 1);
    }

    #[test]
    fn late_minutes_round_up() {
        // 22 minutes 30 seconds past grace end
        let decision = evaluate_clock_in(&standard_hours(), at(9, 37, 30)).unwrap();
        assert_eq!(decision.late_minutes, 23);
    }

    #[test]
    fn clock_out_without_overtime() {
        let decision =
            evaluate_clock_out(&standard_hours(), at(9, 0, 0), at(16, 30, 0), None).unwrap();
        assert_eq!(decision.hours_worked, 7.5);
        assert_eq!(decision.overtime_hrs, 0.0);
        assert!(!decision.is_half_day);
        assert_eq!(decision.status, DayStatus::Present);
    }

    #[test]
    fn overtime_accrues_past_scheduled_end() {
        let decision =
            evaluate_clock_out(&standard_hours(), at(9, 0, 0), at(19, 0, 0), None).unwrap();
        assert_eq!(decision.hours_worked, 10.0);
        assert_eq!(decision.overtime_hrs, 2.0);
    }

    #[test]
    fn overtime_is_capped_at_hours_worked() {
        // Clocked in long after scheduled end: worked 1h, past-end span 2.5h.
        let decision =
            evaluate_clock_out(&standard_hours(), at(18, 30, 0), at(19, 30, 0), None).unwrap();
        assert_eq!(decision.hours_worked, 1.0);
        assert_eq!(decision.overtime_hrs, 1.0);
    }

    #[test]
    fn clock_out_in_the_noon_minute_forces_half_day() {
        let decision = evaluate_clock_out(
            &standard_hours(),
            at(9, 0, 0),
            at(12, 0, 0),
            Some(DayStatus::Late),
        )
        .unwrap();
        assert!(decision.is_half_day);
        assert_eq!(decision.status, DayStatus::HalfDay);

        // Minute granularity: seconds within 12:00 still count.
        let decision = evaluate_clock_out(
            &standard_hours(),
            at(9, 0, 0),
            at(12, 0, 45),
            Some(DayStatus::Present),
        )
        .unwrap();
        assert!(decision.is_half_day);
    }

    #[test]
    fn clock_out_past_noon_keeps_prior_status() {
        let decision = evaluate_clock_out(
            &standard_hours(),
            at(9, 20, 0),
            at(12, 1, 0),
            Some(DayStatus::Late),
        )
        .unwrap();
        assert!(!decision.is_half_day);
        assert_eq!(decision.status, DayStatus::Late);
    }

    #[test]
    fn clock_out_before_clock_in_is_invalid() {
        let err =
            evaluate_clock_out(&standard_hours(), at(10, 0, 0), at(9, 0, 0), None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn leave_takes_precedence_over_holiday_during_generation() {
        assert_eq!(pending_day_status(true, true), Some(DayStatus::OnLeave));
        assert_eq!(pending_day_status(false, true), Some(DayStatus::Holiday));
        assert_eq!(pending_day_status(false, false), None);
    }

    #[test]
    fn rollup_rejected_while_shift_is_ongoing() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let err = check_rollup_eligibility(&standard_hours(), date, at(16, 30, 0)).unwrap_err();
        assert!(err.to_string().contains("30 minutes remaining"));

        assert!(check_rollup_eligibility(&standard_hours(), date, at(17, 0, 0)).is_ok());
    }

    #[test]
    fn rollup_for_overnight_shift_waits_for_next_day() {
        let wh = WorkingHours {
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            late_grace_minutes: 15,
            late_deduction_rate_per_hour: 100.0,
        };
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        // 23:00 the same evening: shift runs until 06:00 next morning.
        let err = check_rollup_eligibility(&wh, date, at(23, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));

        let next_morning = NaiveDate::from_ymd_opt(2026, 3, 3)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert!(check_rollup_eligibility(&wh, date, next_morning).is_ok());
    }
}
