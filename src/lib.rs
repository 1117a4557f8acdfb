// ============================================================================
// rowbind: typed row to object mapping
// ============================================================================

extern crate self as rowbind;

pub mod context;
pub mod core;
pub mod entity;
pub mod mapper;
pub mod processor;
pub mod reader;
pub mod result;
pub mod utils;

// Re-export main types for convenience
pub use context::{MapperConfig, MapperContext};
pub use core::{AccessKind, Column, ColumnDescriptor, ConstructionKind, MapError, Result, Row, Value};
pub use entity::{Entity, EntityType};
pub use mapper::{AnnotationMapper, FnMapper, MapMapper, Mapper, PropertyMapper};
pub use processor::{AnnotationProcessor, PropertyProcessor};
pub use reader::{CodedEnum, FieldType, Iso8601Provider, ReaderProvider, ReaderRegistry, StandardProvider, ValueReader};
pub use result::{QueryResult, RowCursor, RowSource};
pub use utils::{LowerKeyMap, decamelize};

/// `#[derive(Entity)]` and `#[derive(CodedEnum)]`
pub use rowbind_derive::{CodedEnum, Entity};
