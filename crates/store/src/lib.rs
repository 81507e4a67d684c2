//! Persistence for iSenior.
//!
//! [`SqliteStore`] implements [`isenior_core::Store`] over a pooled SQLite
//! database. The schema is created on open; [`seed`] fills reference tables.

pub mod seed;
pub mod sqlite;

pub use seed::{seed_demo_records, seed_reference_data, SeedReport};
pub use sqlite::SqliteStore;
