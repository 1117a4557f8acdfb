use super::{BoxedValue, TargetType, ValueReader};
use crate::core::{Result, Value};
use crate::result::RowSource;
use crate::result::source::mismatch;
use std::any::Any;

pub type ReadFn<T> = fn(&dyn RowSource, usize) -> Result<T>;

/// Reader for exactly one target type, extracting through a typed getter.
pub struct TypedReader<T> {
    name: &'static str,
    read: ReadFn<T>,
}

impl<T: Any + Send> TypedReader<T> {
    pub fn new(read: ReadFn<T>) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            read,
        }
    }
}

impl<T: Any + Send> ValueReader for TypedReader<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, target: &TargetType) -> bool {
        target.is::<T>()
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        Ok(Box::new((self.read)(row, ordinal)?))
    }
}

/// Reader for `Option<T>` where `T` is a primitive whose getter returns a zero
/// value for SQL NULL. The row's NULL flag is checked after the strict read
/// so NULL comes back as `None` instead of `0`/`false`.
pub struct NullableReader<T> {
    name: &'static str,
    read: ReadFn<T>,
}

impl<T: Any + Send> NullableReader<T> {
    pub fn new(read: ReadFn<T>) -> Self {
        Self {
            name: std::any::type_name::<Option<T>>(),
            read,
        }
    }

    pub fn read_nullable(&self, row: &dyn RowSource, ordinal: usize) -> Result<Option<T>> {
        let value = (self.read)(row, ordinal)?;
        Ok(if row.was_null() { None } else { Some(value) })
    }
}

impl<T: Any + Send> ValueReader for NullableReader<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, target: &TargetType) -> bool {
        target.is::<Option<T>>()
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        Ok(Box::new(self.read_nullable(row, ordinal)?))
    }
}

/// Reader for non-primitive strict targets (`String`, dates): SQL NULL has
/// no representation and is a conversion error.
pub struct RequiredReader<T> {
    name: &'static str,
    read: ReadFn<Option<T>>,
}

impl<T: Any + Send> RequiredReader<T> {
    pub fn new(read: ReadFn<Option<T>>) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            read,
        }
    }
}

impl<T: Any + Send> ValueReader for RequiredReader<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, target: &TargetType) -> bool {
        target.is::<T>()
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        match (self.read)(row, ordinal)? {
            Some(value) => Ok(Box::new(value)),
            None => Err(crate::core::MapError::conversion(
                ordinal,
                format!("NULL cannot be stored in {}", self.name),
            )),
        }
    }
}

type MatchFn = Box<dyn Fn(&TargetType) -> bool + Send + Sync>;
type BoxedReadFn = Box<dyn Fn(&dyn RowSource, usize) -> Result<BoxedValue> + Send + Sync>;

/// Reader assembled from closures, for custom match rules.
pub struct FnReader {
    name: String,
    matcher: MatchFn,
    read: BoxedReadFn,
}

impl FnReader {
    pub fn new<M, R>(name: impl Into<String>, matcher: M, read: R) -> Self
    where
        M: Fn(&TargetType) -> bool + Send + Sync + 'static,
        R: Fn(&dyn RowSource, usize) -> Result<BoxedValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Box::new(matcher),
            read: Box::new(read),
        }
    }
}

impl ValueReader for FnReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, target: &TargetType) -> bool {
        (self.matcher)(target)
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        (self.read)(row, ordinal)
    }
}

/// Reader that hands back `Option<T>` only when the driver already returned
/// the native variant; no cross-type coercion is attempted.
pub struct NativeReader<T> {
    name: &'static str,
    extract: fn(Value) -> Option<T>,
}

impl<T: Any + Send> NativeReader<T> {
    pub fn new(extract: fn(Value) -> Option<T>) -> Self {
        Self {
            name: std::any::type_name::<Option<T>>(),
            extract,
        }
    }
}

impl<T: Any + Send> ValueReader for NativeReader<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, target: &TargetType) -> bool {
        target.is::<Option<T>>()
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        let value = row.get_value(ordinal)?;
        if value.is_null() {
            return Ok(Box::new(None::<T>));
        }
        let shown = value.clone();
        match (self.extract)(value) {
            Some(native) => Ok(Box::new(Some(native))),
            None => Err(mismatch(ordinal, &shown, self.name)),
        }
    }
}

/// Catch-all reader: matches every target and returns the row's native
/// [`Value`] untouched.
pub struct ObjectReader;

impl ValueReader for ObjectReader {
    fn name(&self) -> &str {
        "object"
    }

    fn matches(&self, _target: &TargetType) -> bool {
        true
    }

    fn read(&self, row: &dyn RowSource, ordinal: usize) -> Result<BoxedValue> {
        Ok(Box::new(row.get_value(ordinal)?))
    }
}
