//! The storage engine: tables, the row store, secondary indexes, and
//! single-file snapshot persistence.

mod database;
mod snapshot;
mod table;

pub use database::Database;
pub use table::{Row, Table};
