//! Application layer - check cycles and their schedule

pub mod monitor;
pub mod scheduler;

pub use monitor::Monitor;
pub use scheduler::Scheduler;
