use crate::context::{MapperConfig, MapperContext};
use crate::core::{MapError, Result};
use crate::entity::{Entity, EntityType, FieldDef};
use crate::reader::{BoxedValue, ReaderRegistry, ValueReader};
use crate::result::RowSource;
use crate::utils::decamelize_with;
use log::debug;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Convention-mode access to an entity's properties.
///
/// A column label matches a property when it equals the property name or its
/// decamelized form, ignoring case. Properties are tried in declaration
/// order and the first match wins. Labels that match nothing are ignored by
/// every operation.
pub struct PropertyProcessor<T> {
    entity: Arc<EntityType>,
    properties: Vec<Property>,
    marker: PhantomData<fn() -> T>,
}

pub struct Property {
    name: String,
    decamelized: String,
    lower_name: String,
    field: Arc<FieldDef>,
    reader: Arc<dyn ValueReader>,
}

impl Property {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decamelized(&self) -> &str {
        &self.decamelized
    }

    pub fn field(&self) -> &FieldDef {
        &self.field
    }

    pub fn reader(&self) -> &Arc<dyn ValueReader> {
        &self.reader
    }

    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        label == self.lower_name || label == self.decamelized
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("decamelized", &self.decamelized)
            .field("reader", &self.reader.name())
            .finish()
    }
}

impl<T: Entity> PropertyProcessor<T> {
    pub fn new() -> Result<Self> {
        let context = MapperContext::global();
        let registry = context.active_registry()?;
        Ok(Self::with_registry(&registry, context.config()))
    }

    pub fn with_registry(registry: &ReaderRegistry, config: &MapperConfig) -> Self {
        let entity = Arc::new(T::describe());
        let properties: Vec<Property> = entity
            .fields()
            .iter()
            .filter_map(|field| {
                let name = field.property()?.to_string();
                Some(Property {
                    decamelized: decamelize_with(&name, config.name_separator),
                    lower_name: name.to_lowercase(),
                    name,
                    field: field.clone(),
                    reader: registry.get_reader(field.target_type()),
                })
            })
            .collect();
        debug!(
            "Built property processor for {} with {} properties",
            entity.name(),
            properties.len()
        );

        Self {
            entity,
            properties,
            marker: PhantomData,
        }
    }

    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn new_instance(&self) -> Result<T> {
        self.entity.instantiate::<T>()
    }

    /// First property matching `label`.
    pub fn find(&self, label: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.matches(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.find(label).is_some()
    }

    pub fn read(&self, instance: &T, label: &str) -> Result<Option<BoxedValue>> {
        match self.find(label) {
            Some(property) => property.field.get(instance).map(Some),
            None => Ok(None),
        }
    }

    pub fn read_as<F: Any>(&self, instance: &T, label: &str) -> Result<Option<F>> {
        match self.read(instance, label)? {
            Some(value) => value.downcast::<F>().map(|boxed| Some(*boxed)).map_err(|_| {
                MapError::read_failed(
                    self.entity.name(),
                    label,
                    format!("value is not a {}", std::any::type_name::<F>()),
                )
            }),
            None => Ok(None),
        }
    }

    /// Returns whether a property matched.
    pub fn write(&self, instance: &mut T, label: &str, value: BoxedValue) -> Result<bool> {
        match self.find(label) {
            Some(property) => property.field.set(instance, value).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn write_value<F: Any + Send>(&self, instance: &mut T, label: &str, value: F) -> Result<bool> {
        self.write(instance, label, Box::new(value))
    }

    pub fn write_from(&self, instance: &mut T, label: &str, row: &dyn RowSource, ordinal: usize) -> Result<bool> {
        match self.find(label) {
            Some(property) => {
                let value = property.reader.read(row, ordinal)?;
                property.field.set(instance, value).map(|_| true)
            }
            None => Ok(false),
        }
    }
}

impl<T> fmt::Debug for PropertyProcessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyProcessor")
            .field("entity", &self.entity.name())
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::result::ValueRow;

    #[derive(Debug, Default, PartialEq)]
    struct Profile {
        user_id: Option<i64>,
        display_name: Option<String>,
        active: bool,
        secret: Option<String>,
    }

    impl Entity for Profile {
        fn describe() -> EntityType {
            EntityType::builder::<Self>()
                .default_constructor()
                .property("user_id", |p| &p.user_id, |p| &mut p.user_id)
                .property("display_name", |p| &p.display_name, |p| &mut p.display_name)
                .property("active", |p| &p.active, |p| &mut p.active)
                .property("secret", |p| &p.secret, |p| &mut p.secret)
                .skip_property()
                .build()
        }
    }

    fn processor() -> PropertyProcessor<Profile> {
        PropertyProcessor::with_registry(&ReaderRegistry::new(), &MapperConfig::default())
    }

    #[test]
    fn test_label_matching() {
        let p = processor();
        for label in ["userId", "USERID", "user_id", "USER_ID"] {
            assert_eq!(p.find(label).map(Property::name), Some("userId"), "{label}");
        }
        assert!(!p.contains("user-id"));
        assert!(!p.contains("secret"));
        assert_eq!(p.find("display_name").unwrap().decamelized(), "display_name");
    }

    #[test]
    fn test_custom_separator() {
        let p: PropertyProcessor<Profile> =
            PropertyProcessor::with_registry(&ReaderRegistry::new(), &MapperConfig::new().name_separator('-'));
        assert!(p.contains("user-id"));
        assert!(!p.contains("user_id"));
    }

    #[test]
    fn test_unmatched_labels_are_no_ops() {
        let p = processor();
        let mut profile = p.new_instance().unwrap();

        assert!(!p.write_value(&mut profile, "nickname", Some("x".to_string())).unwrap());
        assert!(p.read(&profile, "nickname").unwrap().is_none());
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_write_then_read_returns_same_value() {
        let p = processor();
        let mut profile = Profile::default();

        p.write_value(&mut profile, "DISPLAY_NAME", Some("Ann".to_string())).unwrap();
        assert_eq!(
            p.read_as::<Option<String>>(&profile, "displayName").unwrap(),
            Some(Some("Ann".to_string()))
        );
        assert!(p.read_as::<i32>(&profile, "displayName").is_err());
    }

    #[test]
    fn test_write_from_row() {
        let p = processor();
        let mut profile = Profile::default();
        let values = vec![Value::Null, Value::Integer(1)];
        let row = ValueRow::new(&values);

        assert!(p.write_from(&mut profile, "user_id", &row, 0).unwrap());
        assert!(p.write_from(&mut profile, "active", &row, 1).unwrap());
        assert_eq!(profile.user_id, None);
        assert!(profile.active);
    }
}
