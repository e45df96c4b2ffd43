pub mod attendance;
pub mod employee;
pub mod reports;
pub mod schedule;
