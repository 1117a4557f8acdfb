//! Runtime descriptions of mappable types.
//!
//! Rust has no reflection, so every target type describes itself once through
//! [`Entity::describe`]: how to construct it and, per field, how to reach it,
//! which column it binds to and which property name it answers to in
//! convention mode. `#[derive(Entity)]` writes the description for you.

mod access;
mod builder;

pub use access::AccessorKind;
pub use builder::EntityBuilder;

use crate::core::{ConstructionKind, MapError, Result};
use crate::reader::{BoxedValue, TargetType};
use access::{NestAccess, ValueAccess};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type rows can be mapped into.
pub trait Entity: Any + Send + Sized {
    fn describe() -> EntityType;
}

type ConstructFn = Arc<dyn Fn() -> std::result::Result<Box<dyn Any + Send>, String> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Constructor {
    Missing,
    Private,
    Available(ConstructFn),
}

/// How a field takes part in explicit-binding mapping.
#[derive(Clone)]
pub enum Binding {
    /// Bound to a column.
    Column(String),
    /// Holds a sub-object whose own fields are bound; the alias is a path
    /// segment.
    Nest {
        alias: String,
        describe: fn() -> EntityType,
    },
    /// Only visible to convention-mode mapping.
    Unbound,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => f.debug_tuple("Column").field(name).finish(),
            Self::Nest { alias, .. } => f.debug_struct("Nest").field("alias", alias).finish(),
            Self::Unbound => write!(f, "Unbound"),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Access {
    Value(Arc<dyn ValueAccess>),
    Nest(Arc<dyn NestAccess>),
}

/// One field of an entity.
#[derive(Clone)]
pub struct FieldDef {
    field_name: &'static str,
    declaring_type: &'static str,
    binding: Binding,
    property: Option<String>,
    target: TargetType,
    access: Access,
}

impl FieldDef {
    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    /// Name of the type that declares this field, which for a field coming
    /// from a base struct is the base type.
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Property name used in convention mode, `None` when excluded.
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn target_type(&self) -> &TargetType {
        &self.target
    }

    pub fn accessor_kind(&self) -> AccessorKind {
        match &self.access {
            Access::Value(access) => access.kind(),
            Access::Nest(_) => AccessorKind::Field,
        }
    }

    pub fn is_nest(&self) -> bool {
        matches!(self.access, Access::Nest(_))
    }

    /// Reads the field's current value from `owner`.
    pub fn get(&self, owner: &dyn Any) -> Result<BoxedValue> {
        match &self.access {
            Access::Value(access) => access
                .get(owner)
                .map_err(|reason| MapError::read_failed(self.declaring_type, self.field_name, reason)),
            Access::Nest(_) => Err(MapError::read_failed(
                self.declaring_type,
                self.field_name,
                "nested object fields hold no column value",
            )),
        }
    }

    /// Stores `value` into the field of `owner`. The value's dynamic type must
    /// be the field's declared type.
    pub fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> Result<()> {
        match &self.access {
            Access::Value(access) => access
                .set(owner, value)
                .map_err(|reason| MapError::write_failed(self.declaring_type, self.field_name, reason)),
            Access::Nest(_) => Err(MapError::write_failed(
                self.declaring_type,
                self.field_name,
                "nested object fields hold no column value",
            )),
        }
    }

    pub(crate) fn nested<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        match &self.access {
            Access::Nest(access) => access
                .get(owner)
                .map_err(|reason| MapError::read_failed(self.declaring_type, self.field_name, reason)),
            Access::Value(_) => Err(self.not_nested(crate::core::AccessKind::Read)),
        }
    }

    pub(crate) fn nested_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>> {
        match &self.access {
            Access::Nest(access) => access
                .get_mut(owner)
                .map_err(|reason| MapError::write_failed(self.declaring_type, self.field_name, reason)),
            Access::Value(_) => Err(self.not_nested(crate::core::AccessKind::Write)),
        }
    }

    pub(crate) fn attach(&self, owner: &mut dyn Any, child: Box<dyn Any + Send>) -> Result<()> {
        match &self.access {
            Access::Nest(access) => access
                .attach(owner, child)
                .map_err(|reason| MapError::write_failed(self.declaring_type, self.field_name, reason)),
            Access::Value(_) => Err(self.not_nested(crate::core::AccessKind::Write)),
        }
    }

    fn not_nested(&self, kind: crate::core::AccessKind) -> MapError {
        MapError::FieldAccess {
            type_name: self.declaring_type.to_string(),
            field: self.field_name.to_string(),
            kind,
            reason: "field does not hold a nested object".to_string(),
        }
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("field_name", &self.field_name)
            .field("declaring_type", &self.declaring_type)
            .field("binding", &self.binding)
            .field("property", &self.property)
            .field("target", &self.target)
            .finish()
    }
}

/// Erased description of an [`Entity`]: constructor plus fields in
/// declaration order, base-struct fields last.
#[derive(Clone)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
    constructor: Constructor,
    fields: Vec<Arc<FieldDef>>,
}

impl EntityType {
    pub fn builder<T: Any + Send>() -> EntityBuilder<T> {
        EntityBuilder::new()
    }

    pub fn of<T: Entity>() -> Self {
        T::describe()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Arc<FieldDef>] {
        &self.fields
    }

    pub fn field(&self, field_name: &str) -> Option<&Arc<FieldDef>> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Creates a fresh instance through the registered zero-argument
    /// constructor.
    pub fn new_instance(&self) -> Result<Box<dyn Any + Send>> {
        match &self.constructor {
            Constructor::Available(construct) => {
                construct().map_err(|detail| MapError::Construction {
                    type_name: self.name.to_string(),
                    kind: ConstructionKind::Failed,
                    detail: Some(detail),
                })
            }
            Constructor::Private => Err(MapError::construction(self.name, ConstructionKind::Inaccessible)),
            Constructor::Missing => Err(MapError::construction(self.name, ConstructionKind::NotFound)),
        }
    }

    pub fn instantiate<T: Any>(&self) -> Result<T> {
        let instance = self.new_instance()?;
        instance.downcast::<T>().map(|boxed| *boxed).map_err(|_| MapError::Construction {
            type_name: self.name.to_string(),
            kind: ConstructionKind::Failed,
            detail: Some(format!("constructor did not produce a {}", std::any::type_name::<T>())),
        })
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}
