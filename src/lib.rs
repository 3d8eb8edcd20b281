//! # SimpleDB
//!
//! An embeddable relational engine: a restricted SQL dialect, an
//! in-memory row store with schema-enforced constraints, and a
//! single-file snapshot persistence layer.
//!
//! ## Quick start
//!
//! ```rust
//! use simpledb::executor::{ExecResult, Executor};
//! use simpledb::storage::Database;
//!
//! let mut executor = Executor::new(Database::in_memory());
//! executor.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50));");
//! executor.execute("INSERT INTO users VALUES (1, 'Alice');");
//!
//! match executor.execute("SELECT * FROM users;") {
//!     ExecResult::Rows { columns, rows, count } => {
//!         println!("{} row(s), columns: {:?}", count, columns);
//!         let _ = rows;
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! ## Layout
//!
//! - [`lexer`] / [`ast`] / [`parser`] — tokenize and parse the SQL dialect.
//! - [`types`] — runtime `Value`s and column schema/constraints.
//! - [`storage`] — tables, the row store, and snapshot persistence.
//! - [`executor`] — runs parsed commands against a `Database`.
//! - [`repl`] — the interactive shell used by the `simpledb` binary.
//! - Zero third-party dependencies: standard library only.

pub mod ast;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod storage;
pub mod types;

pub use error::{Result, SimpleDbError};
pub use executor::{ExecResult, Executor};
pub use storage::Database;
