pub mod business;
pub mod hours;
pub mod overlay;

pub use business::{Business, StaffMember};
pub use hours::{
    parse_week, serialize_week, BreakInterval, BreakRecord, DayRecord, DaySchedule,
    ScheduleError, TimeOfDay, WeekSchedule,
};
pub use overlay::ScheduleOverlay;
