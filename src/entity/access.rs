//! Type-erased field access.
//!
//! Each registered field is reached through one of the structs below. They
//! are generic over the declaring type and the field type, and erased behind
//! [`ValueAccess`] / [`NestAccess`] so the processors can walk any entity
//! through `dyn Any`. Failures come back as plain reasons; the caller adds
//! the type and field names.

use super::Entity;
use crate::reader::BoxedValue;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) type AccessResult<T> = std::result::Result<T, String>;

/// How a field is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// Directly through the struct field.
    Field,
    /// Through getter/setter methods.
    Method,
}

pub(crate) trait ValueAccess: Send + Sync {
    fn kind(&self) -> AccessorKind;

    fn get(&self, owner: &dyn Any) -> AccessResult<BoxedValue>;

    fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> AccessResult<()>;
}

pub(crate) trait NestAccess: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> AccessResult<Option<&'a dyn Any>>;

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> AccessResult<Option<&'a mut dyn Any>>;

    fn attach(&self, owner: &mut dyn Any, child: Box<dyn Any + Send>) -> AccessResult<()>;
}

fn owner_ref<T: Any>(owner: &dyn Any) -> AccessResult<&T> {
    owner
        .downcast_ref::<T>()
        .ok_or_else(|| format!("instance is not a {}", std::any::type_name::<T>()))
}

fn owner_mut<T: Any>(owner: &mut dyn Any) -> AccessResult<&mut T> {
    owner
        .downcast_mut::<T>()
        .ok_or_else(|| format!("instance is not a {}", std::any::type_name::<T>()))
}

fn unbox<F: Any>(value: BoxedValue) -> AccessResult<F> {
    value
        .downcast::<F>()
        .map(|boxed| *boxed)
        .map_err(|_| format!("value is not a {}", std::any::type_name::<F>()))
}

pub(crate) struct FieldSlot<T, F> {
    pub(crate) get: fn(&T) -> &F,
    pub(crate) get_mut: fn(&mut T) -> &mut F,
}

impl<T, F> ValueAccess for FieldSlot<T, F>
where
    T: Any,
    F: Any + Send + Clone,
{
    fn kind(&self) -> AccessorKind {
        AccessorKind::Field
    }

    fn get(&self, owner: &dyn Any) -> AccessResult<BoxedValue> {
        let owner = owner_ref::<T>(owner)?;
        Ok(Box::new((self.get)(owner).clone()))
    }

    fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> AccessResult<()> {
        let owner = owner_mut::<T>(owner)?;
        *(self.get_mut)(owner) = unbox::<F>(value)?;
        Ok(())
    }
}

pub(crate) struct MethodPair<T, F> {
    pub(crate) getter: Option<fn(&T) -> F>,
    pub(crate) setter: Option<fn(&mut T, F)>,
}

impl<T, F> ValueAccess for MethodPair<T, F>
where
    T: Any,
    F: Any + Send,
{
    fn kind(&self) -> AccessorKind {
        AccessorKind::Method
    }

    fn get(&self, owner: &dyn Any) -> AccessResult<BoxedValue> {
        let getter = self.getter.ok_or("property has no getter")?;
        Ok(Box::new(getter(owner_ref::<T>(owner)?)))
    }

    fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> AccessResult<()> {
        let setter = self.setter.ok_or("property has no setter")?;
        let owner = owner_mut::<T>(owner)?;
        setter(owner, unbox::<F>(value)?);
        Ok(())
    }
}

/// `Option<N>` holding the nested entity inline.
pub(crate) struct InlineNest<T, N> {
    pub(crate) get: fn(&T) -> &Option<N>,
    pub(crate) get_mut: fn(&mut T) -> &mut Option<N>,
}

impl<T: Any, N: Entity> NestAccess for InlineNest<T, N> {
    fn get<'a>(&self, owner: &'a dyn Any) -> AccessResult<Option<&'a dyn Any>> {
        let owner = owner_ref::<T>(owner)?;
        Ok((self.get)(owner).as_ref().map(|n| n as &dyn Any))
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> AccessResult<Option<&'a mut dyn Any>> {
        let owner = owner_mut::<T>(owner)?;
        Ok((self.get_mut)(owner).as_mut().map(|n| n as &mut dyn Any))
    }

    fn attach(&self, owner: &mut dyn Any, child: Box<dyn Any + Send>) -> AccessResult<()> {
        let owner = owner_mut::<T>(owner)?;
        *(self.get_mut)(owner) = Some(unbox::<N>(child)?);
        Ok(())
    }
}

/// `Option<Box<N>>`, needed when an entity nests its own type.
pub(crate) struct BoxedNest<T, N> {
    pub(crate) get: fn(&T) -> &Option<Box<N>>,
    pub(crate) get_mut: fn(&mut T) -> &mut Option<Box<N>>,
}

impl<T: Any, N: Entity> NestAccess for BoxedNest<T, N> {
    fn get<'a>(&self, owner: &'a dyn Any) -> AccessResult<Option<&'a dyn Any>> {
        let owner = owner_ref::<T>(owner)?;
        Ok((self.get)(owner).as_deref().map(|n| n as &dyn Any))
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> AccessResult<Option<&'a mut dyn Any>> {
        let owner = owner_mut::<T>(owner)?;
        Ok((self.get_mut)(owner).as_deref_mut().map(|n| n as &mut dyn Any))
    }

    fn attach(&self, owner: &mut dyn Any, child: Box<dyn Any + Send>) -> AccessResult<()> {
        let owner = owner_mut::<T>(owner)?;
        let child = child
            .downcast::<N>()
            .map_err(|_| format!("value is not a {}", std::any::type_name::<N>()))?;
        *(self.get_mut)(owner) = Some(child);
        Ok(())
    }
}

/// Reaches a field of an embedded base struct `B` through `T`.
pub(crate) struct ThroughBase<T, B, A: ?Sized> {
    pub(crate) project: fn(&T) -> &B,
    pub(crate) project_mut: fn(&mut T) -> &mut B,
    pub(crate) inner: Arc<A>,
    pub(crate) marker: PhantomData<fn() -> T>,
}

impl<T: Any, B: Any> ValueAccess for ThroughBase<T, B, dyn ValueAccess> {
    fn kind(&self) -> AccessorKind {
        self.inner.kind()
    }

    fn get(&self, owner: &dyn Any) -> AccessResult<BoxedValue> {
        let base = (self.project)(owner_ref::<T>(owner)?);
        self.inner.get(base)
    }

    fn set(&self, owner: &mut dyn Any, value: BoxedValue) -> AccessResult<()> {
        let base = (self.project_mut)(owner_mut::<T>(owner)?);
        self.inner.set(base, value)
    }
}

impl<T: Any, B: Any> NestAccess for ThroughBase<T, B, dyn NestAccess> {
    fn get<'a>(&self, owner: &'a dyn Any) -> AccessResult<Option<&'a dyn Any>> {
        let base = (self.project)(owner_ref::<T>(owner)?);
        self.inner.get(base)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> AccessResult<Option<&'a mut dyn Any>> {
        let base = (self.project_mut)(owner_mut::<T>(owner)?);
        self.inner.get_mut(base)
    }

    fn attach(&self, owner: &mut dyn Any, child: Box<dyn Any + Send>) -> AccessResult<()> {
        let base = (self.project_mut)(owner_mut::<T>(owner)?);
        self.inner.attach(base, child)
    }
}
