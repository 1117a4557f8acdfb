use super::Mapper;
use crate::context::{MapperConfig, MapperContext};
use crate::core::{ColumnDescriptor, Result};
use crate::entity::Entity;
use crate::processor::PropertyProcessor;
use crate::reader::ReaderRegistry;
use crate::result::RowSource;
use std::sync::Arc;

/// Maps rows into `T` by matching column labels to property names.
#[derive(Debug)]
pub struct PropertyMapper<T> {
    processor: PropertyProcessor<T>,
}

impl<T: Entity> PropertyMapper<T> {
    pub fn instance() -> Result<Arc<Self>> {
        MapperContext::global().property_mapper::<T>()
    }

    pub fn with_registry(registry: &ReaderRegistry, config: &MapperConfig) -> Self {
        Self {
            processor: PropertyProcessor::with_registry(registry, config),
        }
    }

    pub fn processor(&self) -> &PropertyProcessor<T> {
        &self.processor
    }
}

impl<T: Entity> Mapper<T> for PropertyMapper<T> {
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<T> {
        let mut instance = self.processor.new_instance()?;
        for column in columns {
            self.processor
                .write_from(&mut instance, &column.label, row, column.ordinal)?;
        }
        Ok(instance)
    }
}
