pub mod calc;
pub mod service;

pub use calc::{AttendanceTotals, OvertimeGroup, PayrollBreakdown};
pub use service::{CreatePayroll, CreatedPayroll};
