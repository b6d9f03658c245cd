//! # weekboard
//!
//! A weekly kanban board for household tasks. Tasks live in a backlog, in
//! one of the seven day columns of a calendar week, or in the completed
//! column. Weeks are identified by the ISO date of their first day.
//!
//! The engines are pure functions over in-memory snapshots with the current
//! instant passed in:
//!
//! * [`week`]: week keys, day labels and the calendar policy.
//! * [`bucket`]: grouping tasks into board columns by priority.
//! * [`streak`]: consecutive-day completion streaks and milestones.
//! * [`rollover`]: returning stale tasks to backlog and archiving past weeks.
//!
//! [`storage`], [`tasks`] and [`commands`] wrap them in a JSON-file board
//! driven from the command line.

pub mod bucket;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod recurring;
pub mod review;
pub mod rollover;
pub mod storage;
pub mod streak;
pub mod tasks;
pub mod week;

pub use error::{Error, Result};
