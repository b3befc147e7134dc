//! # Tickoff Core Library
//!
//! This library provides the core logic for Tickoff, a personal todo list
//! with a daily completion streak. All operations are available through the
//! `tickoff` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: pure calendar-day state machine that turns completion
//!   events into a current/longest streak and a running total
//! - **Clock**: supplies "today" as a calendar day (local, UTC or fixed)
//! - **Storage**: SQLite persistence with versioned streak rows, and
//!   TOML-based configuration
//! - **Tracker**: runs the load/compute/save cycle and fires completions
//!   when todos are checked off
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: streak state machine
//! - [`Tracker`]: completion trigger and status query
//! - [`Database`]: todo and streak persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod service;
pub mod storage;
pub mod streak;
pub mod todo;

pub use error::{ConfigError, CoreError, DatabaseError, StoreError, StreakError, ValidationError};
pub use service::{TodoUpdate, Tracker};
pub use storage::{Config, Database, StreakStore, TodoStore, Versioned};
pub use streak::{
    day_difference, BackdatePolicy, Clock, ClockMode, FixedClock, StreakEngine, StreakRecord,
    StreakView,
};
pub use todo::{Todo, TodoPatch};
