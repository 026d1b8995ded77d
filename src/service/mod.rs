pub mod attendance;
pub mod policy;

pub use attendance::AttendanceService;
