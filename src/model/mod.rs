pub mod attendance;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod overtime;
pub mod payroll;
pub mod working_hours;

pub use attendance::{AttendanceDaily, AttendanceLog, DayStatus};
pub use employee::Employee;
pub use holiday::Holiday;
pub use leave::{LeaveRequest, LeaveStatus};
pub use overtime::{OvertimeRequest, OvertimeStatus, OvertimeType};
pub use payroll::{PayComponent, PayrollPeriod, PayrollRecord, PayrollStatus};
pub use working_hours::WorkingHours;
