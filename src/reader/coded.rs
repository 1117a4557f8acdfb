use super::{BoxedValue, TargetType, ValueReader};
use crate::core::Result;
use crate::result::RowSource;
use std::marker::PhantomData;
use std::sync::Arc;

/// A closed set of values, each carrying an integer code and a label.
///
/// Fields of type `Option<E>` are filled by looking up the column's integer
/// code among [`variants`](CodedEnum::variants).
pub trait CodedEnum: Copy + PartialEq + Send + Sync + 'static {
    fn variants() -> &'static [Self];

    fn code(&self) -> i32;

    fn label(&self) -> &'static str;

    fn from_code(code: i32) -> Option<Self> {
        Self::variants().iter().copied().find(|v| v.code() == code)
    }

    fn contains(&self, candidates: &[Self]) -> bool {
        candidates.contains(self)
    }
}

/// Reads an integer column and resolves it to a variant of `E`.
/// NULL and unknown codes both produce `None`.
pub struct CodedEnumReader<E> {
    marker: PhantomData<fn() -> E>,
}

impl<E: CodedEnum> CodedEnumReader<E> {
    pub fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }

    pub(crate) fn shared() -> Arc<dyn ValueReader> {
        Arc::new(Self::new())
    }

    pub fn read_code(&self, row: &dyn RowSource, ordinal: usize) -> Result<Option<E>> {
        let code = row.get_i64(ordinal)?;
        if row.was_null() {
            return Ok(None);
        }
        // A code wider than i32 matches no variant.
        Ok(i32::try_from(code).ok().and_then(E::from_code))
    }
}

impl<E: CodedEnum> Default for CodedEnumReader<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CodedEnum> ValueReader for CodedEnumReader<E> {
    fn name(&self) -> &str {
        std::any::type_name::<E>()
    }

    fn matches(&self, target: &TargetType) -> bool {
        target.is::<Option<E>>()
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        Ok(Box::new(self.read_code(row, ordinal)?))
    }
}
