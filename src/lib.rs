//! Core library surface for the Student Roster application.
//!
//! `db` persists student records, `view` keeps the displayed snapshot in sync
//! with the store, and `ui` is the terminal front end that drives both. The
//! binary only wires these together.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;
pub mod view;

pub use config::Config;
pub use db::RecordStore;
pub use error::{AppError, DataStoreError, ValidationError};
pub use models::{Course, StudentInput, StudentRecord};
pub use ui::{run_app, App};
pub use view::{Applied, RosterView, SnapshotState};
