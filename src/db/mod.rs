//! Persistence module: the SQLite-backed record store.

mod connection;
mod students;

pub use students::RecordStore;
