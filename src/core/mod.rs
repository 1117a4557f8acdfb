pub mod error;
pub mod types;
pub mod value;

pub use error::{AccessKind, ConstructionKind, MapError, Result};
pub use types::{Column, ColumnDescriptor, Row};
pub use value::Value;
