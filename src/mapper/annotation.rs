use super::Mapper;
use crate::context::{MapperConfig, MapperContext};
use crate::core::{ColumnDescriptor, Result};
use crate::entity::Entity;
use crate::processor::AnnotationProcessor;
use crate::reader::ReaderRegistry;
use crate::result::RowSource;
use std::sync::Arc;

/// Maps rows into `T` through its explicit column and nest bindings.
///
/// Columns whose label resolves to no leaf are skipped.
#[derive(Debug)]
pub struct AnnotationMapper<T> {
    processor: AnnotationProcessor<T>,
}

impl<T: Entity> AnnotationMapper<T> {
    /// Shared mapper for `T` from the global context. Fails if `T`'s
    /// bindings nest cyclically.
    pub fn instance() -> Result<Arc<Self>> {
        MapperContext::global().annotation_mapper::<T>()
    }

    pub fn with_registry(registry: &ReaderRegistry, config: &MapperConfig) -> Result<Self> {
        Ok(Self {
            processor: AnnotationProcessor::with_registry(registry, config)?,
        })
    }

    pub fn processor(&self) -> &AnnotationProcessor<T> {
        &self.processor
    }
}

impl<T: Entity> Mapper<T> for AnnotationMapper<T> {
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<T> {
        let mut instance = self.processor.new_instance()?;
        for column in columns {
            if let Some(node) = self.processor.resolve(&column.label) {
                node.write_from(&mut instance, row, column.ordinal)?;
            }
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::entity::EntityType;
    use crate::result::QueryResult;

    #[derive(Debug, Default, PartialEq)]
    struct City {
        name: Option<String>,
    }

    impl Entity for City {
        fn describe() -> EntityType {
            EntityType::builder::<Self>()
                .default_constructor()
                .column("name", "name", |c| &c.name, |c| &mut c.name)
                .build()
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i32,
        city: Option<City>,
    }

    impl Entity for Person {
        fn describe() -> EntityType {
            EntityType::builder::<Self>()
                .default_constructor()
                .column("id", "id", |p| &p.id, |p| &mut p.id)
                .nest("city", "city", |p| &p.city, |p| &mut p.city)
                .build()
        }
    }

    fn mapper() -> AnnotationMapper<Person> {
        AnnotationMapper::with_registry(&ReaderRegistry::new(), &MapperConfig::default()).unwrap()
    }

    #[test]
    fn test_maps_nested_columns_and_skips_unknown() {
        let result = QueryResult::from_labels(
            ["ID", "city$name", "extra"],
            vec![
                vec![Value::Integer(1), Value::Text("Kyoto".into()), Value::Integer(9)],
                vec![Value::Integer(2), Value::Null, Value::Null],
            ],
        );

        let people = mapper().map_result(&result).unwrap();
        assert_eq!(
            people,
            vec![
                Person {
                    id: 1,
                    city: Some(City {
                        name: Some("Kyoto".into())
                    })
                },
                Person {
                    id: 2,
                    city: Some(City { name: None })
                },
            ]
        );
    }

    #[test]
    fn test_nested_object_stays_absent_without_its_columns() {
        let result = QueryResult::from_labels(["id"], vec![vec![Value::Integer(5)]]);
        let mut cursor = result.cursor();

        let person = mapper().map_one(&mut cursor).unwrap().unwrap();
        assert_eq!(person, Person { id: 5, city: None });
        assert!(mapper().map_one(&mut cursor).unwrap().is_none());
    }
}
