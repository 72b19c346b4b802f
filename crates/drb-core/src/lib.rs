pub mod cycle;
pub mod registry;
pub mod tracker;

pub use cycle::{most_recent_boundary, next_boundary, reconcile, StatusMap};
pub use registry::{Registry, ReminderDef};
pub use tracker::{ReminderView, Tracker};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("a reminder named '{0}' already exists")]
    DuplicateName(String),
    #[error("reset time {hour:02}:{minute:02} is out of range (hour 0-23, minute 0-59)")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("no reminder named '{0}'")]
    UnknownReminder(String),
    #[error("reminder name cannot be empty")]
    EmptyName,
}
