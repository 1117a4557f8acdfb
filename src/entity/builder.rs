use super::access::{BoxedNest, FieldSlot, InlineNest, MethodPair, NestAccess, ThroughBase, ValueAccess};
use super::{Access, Binding, Constructor, Entity, EntityType, FieldDef};
use crate::reader::{FieldType, TargetType};
use crate::utils::camelize;
use std::any::{Any, TypeId};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// Collects the description of `T` field by field.
///
/// Fields keep registration order. Fields flattened from base structs through
/// [`base`](EntityBuilder::base) are placed after the type's own fields.
pub struct EntityBuilder<T> {
    name: &'static str,
    constructor: Constructor,
    fields: Vec<FieldDef>,
    inherited: Vec<FieldDef>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send> EntityBuilder<T> {
    pub(super) fn new() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()),
            constructor: Constructor::Missing,
            fields: Vec::new(),
            inherited: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Override the name used in error messages
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Construct instances through `T::default()`
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|| Ok::<T, std::convert::Infallible>(T::default()))
    }

    /// Construct instances through a fallible zero-argument function
    pub fn constructor<E: Display + 'static>(mut self, construct: fn() -> std::result::Result<T, E>) -> Self {
        self.constructor = Constructor::Available(Arc::new(move || {
            construct()
                .map(|instance| Box::new(instance) as Box<dyn Any + Send>)
                .map_err(|e| e.to_string())
        }));
        self
    }

    /// The type has a constructor, but mapping code may not call it
    pub fn private_constructor(mut self) -> Self {
        self.constructor = Constructor::Private;
        self
    }

    /// Leaf bound to column `binding`, reached directly through the field.
    pub fn column<F>(
        self,
        binding: impl Into<String>,
        field_name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self
    where
        F: FieldType + Clone,
    {
        let access = Arc::new(FieldSlot { get, get_mut });
        self.push_value::<F>(field_name, Binding::Column(binding.into()), access)
    }

    /// Leaf bound to column `binding`, reached through getter/setter methods.
    /// Either side may be absent; using the missing side is an access error.
    pub fn column_with<F>(
        self,
        binding: impl Into<String>,
        field_name: &'static str,
        getter: Option<fn(&T) -> F>,
        setter: Option<fn(&mut T, F)>,
    ) -> Self
    where
        F: FieldType,
    {
        let access = Arc::new(MethodPair { getter, setter });
        self.push_value::<F>(field_name, Binding::Column(binding.into()), access)
    }

    /// Field only visible to convention-mode mapping.
    pub fn property<F>(self, field_name: &'static str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self
    where
        F: FieldType + Clone,
    {
        let access = Arc::new(FieldSlot { get, get_mut });
        self.push_value::<F>(field_name, Binding::Unbound, access)
    }

    pub fn property_with<F>(
        self,
        field_name: &'static str,
        getter: Option<fn(&T) -> F>,
        setter: Option<fn(&mut T, F)>,
    ) -> Self
    where
        F: FieldType,
    {
        let access = Arc::new(MethodPair { getter, setter });
        self.push_value::<F>(field_name, Binding::Unbound, access)
    }

    /// Nested entity stored as `Option<N>`, addressed by `alias` as a path
    /// segment.
    pub fn nest<N: Entity>(
        self,
        alias: impl Into<String>,
        field_name: &'static str,
        get: fn(&T) -> &Option<N>,
        get_mut: fn(&mut T) -> &mut Option<N>,
    ) -> Self {
        let access = Arc::new(InlineNest { get, get_mut });
        self.push_nest::<N, Option<N>>(alias.into(), field_name, access)
    }

    /// Nested entity stored as `Option<Box<N>>`.
    pub fn nest_boxed<N: Entity>(
        self,
        alias: impl Into<String>,
        field_name: &'static str,
        get: fn(&T) -> &Option<Box<N>>,
        get_mut: fn(&mut T) -> &mut Option<Box<N>>,
    ) -> Self {
        let access = Arc::new(BoxedNest { get, get_mut });
        self.push_nest::<N, Option<Box<N>>>(alias.into(), field_name, access)
    }

    /// Flattens the fields of the embedded struct `B` into this type, the way
    /// inherited fields sit next to declared ones.
    pub fn base<B: Entity>(mut self, project: fn(&T) -> &B, project_mut: fn(&mut T) -> &mut B) -> Self {
        for field in B::describe().fields {
            let field = FieldDef::clone(&field);
            let access = match field.access {
                Access::Value(inner) => Access::Value(Arc::new(ThroughBase::<T, B, dyn ValueAccess> {
                    project,
                    project_mut,
                    inner,
                    marker: PhantomData,
                })),
                Access::Nest(inner) => Access::Nest(Arc::new(ThroughBase::<T, B, dyn NestAccess> {
                    project,
                    project_mut,
                    inner,
                    marker: PhantomData,
                })),
            };
            self.inherited.push(FieldDef { access, ..field });
        }
        self
    }

    /// Renames the convention-mode property of the last registered field.
    pub fn with_property_name(mut self, name: impl Into<String>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.property = Some(name.into());
        }
        self
    }

    /// Hides the last registered field from convention-mode mapping.
    pub fn skip_property(mut self) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.property = None;
        }
        self
    }

    pub fn build(self) -> EntityType {
        let name = self.name;
        let fields = self
            .fields
            .into_iter()
            .map(|field| FieldDef {
                declaring_type: name,
                ..field
            })
            .chain(self.inherited)
            .map(Arc::new)
            .collect();

        EntityType {
            id: TypeId::of::<T>(),
            name,
            constructor: self.constructor,
            fields,
        }
    }

    fn push_value<F: FieldType>(mut self, field_name: &'static str, binding: Binding, access: Arc<dyn ValueAccess>) -> Self {
        self.fields.push(FieldDef {
            field_name,
            declaring_type: self.name,
            binding,
            property: Some(camelize(field_name)),
            target: F::target_type(),
            access: Access::Value(access),
        });
        self
    }

    fn push_nest<N: Entity, S: Any>(
        mut self,
        alias: String,
        field_name: &'static str,
        access: Arc<dyn NestAccess>,
    ) -> Self {
        self.fields.push(FieldDef {
            field_name,
            declaring_type: self.name,
            binding: Binding::Nest {
                alias,
                describe: N::describe,
            },
            // No reader produces a whole entity, so nests stay out of
            // convention mode.
            property: None,
            target: TargetType::of::<S>(),
            access: Access::Nest(access),
        });
        self
    }
}

/// `my_app::model::User<my_app::Id>` becomes `User<my_app::Id>`.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccessKind;

    #[derive(Default, Clone)]
    struct Audit {
        created_by: Option<String>,
    }

    impl Entity for Audit {
        fn describe() -> EntityType {
            EntityType::builder::<Self>()
                .default_constructor()
                .column("created_by", "created_by", |a| &a.created_by, |a| &mut a.created_by)
                .build()
        }
    }

    #[derive(Default)]
    struct Account {
        id: i64,
        secret: String,
        score: i32,
        audit: Audit,
    }

    impl Account {
        fn score(&self) -> i32 {
            self.score
        }
    }

    impl Entity for Account {
        fn describe() -> EntityType {
            EntityType::builder::<Self>()
                .default_constructor()
                .base(|a| &a.audit, |a| &mut a.audit)
                .column("account_id", "id", |a| &a.id, |a| &mut a.id)
                .property("secret", |a| &a.secret, |a| &mut a.secret)
                .skip_property()
                .property_with("score", Some(Account::score as fn(&Account) -> i32), None)
                .with_property_name("rating")
                .build()
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::User"), "User");
        assert_eq!(short_type_name("User"), "User");
        assert_eq!(short_type_name("a::Wrap<b::Id>"), "Wrap<b::Id>");
    }

    #[test]
    fn test_fields_keep_order_with_base_last() {
        let ty = Account::describe();
        let names: Vec<_> = ty.fields().iter().map(|f| f.field_name()).collect();
        assert_eq!(names, vec!["id", "secret", "score", "created_by"]);
        assert_eq!(ty.name(), "Account");
        assert_eq!(ty.fields()[3].declaring_type(), "Audit");
    }

    #[test]
    fn test_property_names() {
        let ty = Account::describe();
        assert_eq!(ty.field("id").unwrap().property(), Some("id"));
        assert_eq!(ty.field("secret").unwrap().property(), None);
        assert_eq!(ty.field("score").unwrap().property(), Some("rating"));
        assert_eq!(ty.field("created_by").unwrap().property(), Some("createdBy"));
    }

    #[test]
    fn test_base_field_access_goes_through_projection() {
        let ty = Account::describe();
        let mut account = Account::default();
        let created_by = ty.field("created_by").unwrap();

        created_by
            .set(&mut account, Box::new(Some("admin".to_string())))
            .unwrap();
        assert_eq!(account.audit.created_by.as_deref(), Some("admin"));

        let read = created_by.get(&account).unwrap();
        assert_eq!(*read.downcast::<Option<String>>().unwrap(), Some("admin".to_string()));
    }

    #[test]
    fn test_method_without_setter_is_write_failure() {
        let ty = Account::describe();
        let mut account = Account {
            score: 7,
            ..Default::default()
        };
        let score = ty.field("score").unwrap();

        assert_eq!(score.accessor_kind(), crate::entity::AccessorKind::Method);
        assert_eq!(*score.get(&account).unwrap().downcast::<i32>().unwrap(), 7);
        let err = score.set(&mut account, Box::new(9i32)).unwrap_err();
        assert_eq!(err.access_kind(), Some(AccessKind::Write));
    }
}
