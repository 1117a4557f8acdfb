mod result;
pub mod source;

pub use result::{QueryResult, ResultCursor};
pub use source::{RowCursor, RowSource, ValueRow};
