//! Scheduling policies
//!
//! Each policy lives in its own file and is exported here.

mod console;
pub use console::ConsoleScheduler;
