use super::ValueReader;
use super::coded::{CodedEnum, CodedEnumReader};
use crate::core::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Runtime description of a field's declared type, used to pick a reader.
///
/// Identity is the Rust [`TypeId`], so `i32` and `Option<i32>` are distinct
/// targets, which is what lets strict and nullable readers coexist.
#[derive(Clone, Copy)]
pub struct TargetType {
    id: TypeId,
    name: &'static str,
    coded: Option<fn() -> Arc<dyn ValueReader>>,
}

impl TargetType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            coded: None,
        }
    }

    /// Target for a field of type `Option<E>` holding a coded enumeration.
    pub fn coded<E: CodedEnum>() -> Self {
        Self {
            id: TypeId::of::<Option<E>>(),
            name: std::any::type_name::<Option<E>>(),
            coded: Some(CodedEnumReader::<E>::shared),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn is_coded(&self) -> bool {
        self.coded.is_some()
    }

    pub(crate) fn coded_factory(&self) -> Option<fn() -> Arc<dyn ValueReader>> {
        self.coded
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TargetType {}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetType")
            .field("name", &self.name)
            .field("coded", &self.coded.is_some())
            .finish()
    }
}

/// A type that can be the destination of a column value.
///
/// Implement with an empty block for custom types; they then receive the
/// catch-all reader, which yields the row's native [`Value`].
pub trait FieldType: Any + Send {
    fn target_type() -> TargetType
    where
        Self: Sized,
    {
        TargetType::of::<Self>()
    }
}

macro_rules! impl_field_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldType for $ty {}
            impl FieldType for Option<$ty> {}
        )+
    };
}

impl_field_type!(
    bool,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
);

impl FieldType for Value {}

impl<E: CodedEnum> FieldType for Option<E> {
    fn target_type() -> TargetType {
        TargetType::coded::<E>()
    }
}
