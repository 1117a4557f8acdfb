use super::ValueReader;
use super::readers::{NativeReader, NullableReader, RequiredReader, TypedReader};
use crate::core::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::trace;
use std::sync::Arc;

/// Ordered reader list a provider fills in. Earlier entries shadow later ones.
#[derive(Default)]
pub struct ReaderList {
    readers: Vec<Arc<dyn ValueReader>>,
}

impl ReaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: ValueReader + 'static>(&mut self, reader: R) {
        self.push_shared(Arc::new(reader));
    }

    pub fn push_shared(&mut self, reader: Arc<dyn ValueReader>) {
        trace!("Registered value reader #{}: {}", self.readers.len(), reader.name());
        self.readers.push(reader);
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub(crate) fn into_inner(self) -> Vec<Arc<dyn ValueReader>> {
        self.readers
    }
}

/// Decides which readers a [`ReaderRegistry`](super::ReaderRegistry) holds.
///
/// The registry calls the three hooks in order: defaults, temporal, then
/// custom. Override `register_temporal` to change how date/time columns are
/// read, or `register` to append readers of your own. The catch-all reader is
/// always appended by the registry after the last hook.
pub trait ReaderProvider: Send + Sync {
    fn register_defaults(&self, readers: &mut ReaderList) {
        register_default_readers(readers);
    }

    fn register_temporal(&self, readers: &mut ReaderList) {
        register_temporal_readers(readers);
    }

    fn register(&self, _readers: &mut ReaderList) {}
}

/// The stock provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardProvider;

impl ReaderProvider for StandardProvider {}

/// Provider for drivers that return native date, time and timestamp values.
/// Temporal columns are taken as-is; any other representation is a
/// conversion error.
#[derive(Debug, Default, Clone, Copy)]
pub struct Iso8601Provider;

impl ReaderProvider for Iso8601Provider {
    fn register_temporal(&self, readers: &mut ReaderList) {
        readers.push(NativeReader::<NaiveTime>::new(|v| match v {
            Value::Time(t) => Some(t),
            _ => None,
        }));
        readers.push(NativeReader::<NaiveDate>::new(|v| match v {
            Value::Date(d) => Some(d),
            _ => None,
        }));
        readers.push(NativeReader::<NaiveDateTime>::new(|v| match v {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }));
    }
}

/// Strings, then nullable primitives, then strict primitives.
pub fn register_default_readers(readers: &mut ReaderList) {
    readers.push(TypedReader::<Option<String>>::new(|r, i| r.get_string(i)));
    readers.push(RequiredReader::<String>::new(|r, i| r.get_string(i)));

    readers.push(NullableReader::<bool>::new(|r, i| r.get_bool(i)));
    readers.push(NullableReader::<i16>::new(|r, i| r.get_i16(i)));
    readers.push(NullableReader::<i32>::new(|r, i| r.get_i32(i)));
    readers.push(NullableReader::<i64>::new(|r, i| r.get_i64(i)));
    readers.push(NullableReader::<f32>::new(|r, i| r.get_f32(i)));
    readers.push(NullableReader::<f64>::new(|r, i| r.get_f64(i)));
    readers.push(NullableReader::<i8>::new(|r, i| r.get_i8(i)));

    readers.push(TypedReader::<bool>::new(|r, i| r.get_bool(i)));
    readers.push(TypedReader::<i16>::new(|r, i| r.get_i16(i)));
    readers.push(TypedReader::<i32>::new(|r, i| r.get_i32(i)));
    readers.push(TypedReader::<i64>::new(|r, i| r.get_i64(i)));
    readers.push(TypedReader::<f32>::new(|r, i| r.get_f32(i)));
    readers.push(TypedReader::<f64>::new(|r, i| r.get_f64(i)));
    readers.push(TypedReader::<i8>::new(|r, i| r.get_i8(i)));
}

/// Date, time and timestamp readers that coerce through the row's typed
/// getters (a timestamp column read into a date keeps the date part, text is
/// parsed).
pub fn register_temporal_readers(readers: &mut ReaderList) {
    readers.push(TypedReader::<Option<NaiveDate>>::new(|r, i| r.get_date(i)));
    readers.push(RequiredReader::<NaiveDate>::new(|r, i| r.get_date(i)));
    readers.push(TypedReader::<Option<NaiveTime>>::new(|r, i| r.get_time(i)));
    readers.push(RequiredReader::<NaiveTime>::new(|r, i| r.get_time(i)));
    readers.push(TypedReader::<Option<NaiveDateTime>>::new(|r, i| r.get_timestamp(i)));
    readers.push(RequiredReader::<NaiveDateTime>::new(|r, i| r.get_timestamp(i)));
}
