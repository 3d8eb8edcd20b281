//! The value and schema model: runtime `Value`s and the column
//! definitions that constrain them.

pub mod schema;
pub mod value;

pub use schema::{ColumnDef, Constraint, DataType};
pub use value::Value;
