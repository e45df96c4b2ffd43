//! The attendance computation core: pure functions over records,
//! schedules, and employees. Nothing in here touches the store or HTTP.

pub mod compliance;
pub mod exceptions;
pub mod payroll;
pub mod schedule;
pub mod status;
pub mod window;
