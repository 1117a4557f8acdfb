//! Type-directed value extraction.
//!
//! A [`ValueReader`] pulls one column out of a row and converts it into the
//! Rust type a field declares. The [`ReaderRegistry`] picks the reader for a
//! field once, when a processor is built, so row mapping only pays for the
//! conversion itself.

pub mod coded;
pub mod provider;
pub mod readers;
pub mod registry;
pub mod target;

use crate::core::Result;
use crate::result::RowSource;
use std::any::Any;

pub use coded::{CodedEnum, CodedEnumReader};
pub use provider::{Iso8601Provider, ReaderList, ReaderProvider, StandardProvider};
pub use readers::{FnReader, NativeReader, NullableReader, ObjectReader, RequiredReader, TypedReader};
pub use registry::ReaderRegistry;
pub use target::{FieldType, TargetType};

/// A converted column value, typed as the destination field's type.
pub type BoxedValue = Box<dyn Any + Send>;

pub trait ValueReader: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Can this reader produce values for `target`?
    fn matches(&self, target: &TargetType) -> bool;

    /// Read column `ordinal` of the current row.
    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue>;
}
