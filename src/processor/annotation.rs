use crate::context::{MapperConfig, MapperContext};
use crate::core::{MapError, Result};
use crate::entity::{Binding, Entity, EntityType, FieldDef};
use crate::reader::{BoxedValue, ReaderRegistry, TargetType, ValueReader};
use crate::result::RowSource;
use crate::utils::LowerKeyMap;
use log::{debug, trace};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Explicit-binding field tree of an entity.
///
/// Column-bound fields become leaves keyed by their binding name; nest-bound
/// fields become inner nodes whose children are the nested entity's bindings.
/// A column label addresses a leaf through the binding names on the way down,
/// joined by the configured delimiter (`address$zipCode`). Only leaves are
/// addressable.
pub struct AnnotationProcessor<T> {
    entity: Arc<EntityType>,
    fields: LowerKeyMap<FieldNode>,
    delimiter: char,
    marker: PhantomData<fn() -> T>,
}

/// One binding in the tree.
pub struct FieldNode {
    name: String,
    path: String,
    field: Arc<FieldDef>,
    kind: NodeKind,
    chain: Vec<Step>,
}

enum NodeKind {
    Leaf {
        reader: Arc<dyn ValueReader>,
    },
    Nest {
        entity: Arc<EntityType>,
        children: LowerKeyMap<FieldNode>,
    },
}

/// A nest between the root instance and a node.
#[derive(Clone)]
struct Step {
    field: Arc<FieldDef>,
    entity: Arc<EntityType>,
}

impl<T: Entity> AnnotationProcessor<T> {
    /// Builds the tree with the global context's registry and configuration.
    pub fn new() -> Result<Self> {
        let context = MapperContext::global();
        let registry = context.active_registry()?;
        Self::with_registry(&registry, context.config())
    }

    pub fn with_registry(registry: &ReaderRegistry, config: &MapperConfig) -> Result<Self> {
        let entity = Arc::new(T::describe());
        let mut builder = TreeBuilder {
            registry,
            delimiter: config.path_delimiter,
            lineage: vec![entity.id()],
        };
        let fields = builder.scan(&entity, "", &[])?;
        debug!(
            "Built explicit-binding processor for {} with {} top-level bindings",
            entity.name(),
            fields.len()
        );

        Ok(Self {
            entity,
            fields,
            delimiter: config.path_delimiter,
            marker: PhantomData,
        })
    }

    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn new_instance(&self) -> Result<T> {
        self.entity.instantiate::<T>()
    }

    /// Whether `path` addresses a column-bound leaf.
    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// The leaf `path` addresses. Unknown segments and paths that stop at a
    /// nest resolve to `None`.
    pub fn resolve(&self, path: &str) -> Option<&FieldNode> {
        let mut segments = path.split(self.delimiter);
        let mut node = self.fields.get(segments.next()?)?;
        for segment in segments {
            node = match &node.kind {
                NodeKind::Nest { children, .. } => children.get(segment)?,
                NodeKind::Leaf { .. } => return None,
            };
        }
        node.is_leaf().then_some(node)
    }

    /// Top-level bindings, leaves and nests alike.
    pub fn bindings(&self) -> impl Iterator<Item = &FieldNode> {
        self.fields.values()
    }

    /// Reads the value at `path`. `None` when the path is not a leaf or an
    /// intermediate nested object is absent.
    pub fn read(&self, instance: &T, path: &str) -> Result<Option<BoxedValue>> {
        match self.resolve(path) {
            Some(node) => node.read(instance),
            None => Ok(None),
        }
    }

    pub fn read_as<F: Any>(&self, instance: &T, path: &str) -> Result<Option<F>> {
        match self.read(instance, path)? {
            Some(value) => value
                .downcast::<F>()
                .map(|boxed| Some(*boxed))
                .map_err(|_| self.type_mismatch::<F>(path)),
            None => Ok(None),
        }
    }

    /// Writes `value` at `path`, creating missing nested objects on the way.
    /// Returns `false` when the path is not a leaf.
    pub fn write(&self, instance: &mut T, path: &str, value: BoxedValue) -> Result<bool> {
        match self.resolve(path) {
            Some(node) => node.write(instance, value).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn write_value<F: Any + Send>(&self, instance: &mut T, path: &str, value: F) -> Result<bool> {
        self.write(instance, path, Box::new(value))
    }

    /// Extracts column `ordinal` of `row` with the leaf's reader and writes it.
    pub fn write_from(&self, instance: &mut T, path: &str, row: &dyn RowSource, ordinal: usize) -> Result<bool> {
        match self.resolve(path) {
            Some(node) => node.write_from(instance, row, ordinal).map(|_| true),
            None => Ok(false),
        }
    }

    fn type_mismatch<F>(&self, path: &str) -> MapError {
        MapError::read_failed(
            self.entity.name(),
            path,
            format!("value is not a {}", std::any::type_name::<F>()),
        )
    }
}

impl<T> fmt::Debug for AnnotationProcessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationProcessor")
            .field("entity", &self.entity.name())
            .field("fields", &self.fields)
            .field("delimiter", &self.delimiter)
            .finish()
    }
}

impl FieldNode {
    /// Binding name of this node, one path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path from the root entity.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field(&self) -> &FieldDef {
        &self.field
    }

    pub fn target_type(&self) -> &TargetType {
        self.field.target_type()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn reader(&self) -> Option<&Arc<dyn ValueReader>> {
        match &self.kind {
            NodeKind::Leaf { reader } => Some(reader),
            NodeKind::Nest { .. } => None,
        }
    }

    /// Entity type held by a nest node.
    pub fn nested_entity(&self) -> Option<&EntityType> {
        match &self.kind {
            NodeKind::Nest { entity, .. } => Some(entity),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &FieldNode> {
        let children = match &self.kind {
            NodeKind::Nest { children, .. } => Some(children.values()),
            NodeKind::Leaf { .. } => None,
        };
        children.into_iter().flatten()
    }

    /// Number of nested objects between the root instance and this node.
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Walks the nested objects from `root` down to this leaf and reads it.
    /// Stops with `None` at the first absent nested object.
    pub fn read(&self, root: &dyn Any) -> Result<Option<BoxedValue>> {
        if !self.is_leaf() {
            return Ok(None);
        }
        let mut target = root;
        for step in &self.chain {
            match step.field.nested(target)? {
                Some(next) => target = next,
                None => return Ok(None),
            }
        }
        self.field.get(target).map(Some)
    }

    /// Walks from `root` down to this leaf, attaching a fresh instance for
    /// every absent nested object, then stores `value`.
    pub fn write(&self, root: &mut dyn Any, value: BoxedValue) -> Result<()> {
        if !self.is_leaf() {
            return Err(MapError::write_failed(
                self.field.declaring_type(),
                self.field.field_name(),
                "nested object fields hold no column value",
            ));
        }
        let mut target = root;
        for step in &self.chain {
            if step.field.nested(&*target)?.is_none() {
                trace!("Creating nested {} for {}", step.entity.name(), self.path);
                let child = step.entity.new_instance()?;
                step.field.attach(&mut *target, child)?;
            }
            target = step.field.nested_mut(target)?.ok_or_else(|| {
                MapError::write_failed(
                    step.field.declaring_type(),
                    step.field.field_name(),
                    "nested object vanished after attach",
                )
            })?;
        }
        self.field.set(target, value)
    }

    pub fn write_from(&self, root: &mut dyn Any, row: &dyn RowSource, ordinal: usize) -> Result<()> {
        match &self.kind {
            NodeKind::Leaf { reader } => self.write(root, reader.read(row, ordinal)?),
            NodeKind::Nest { .. } => Err(MapError::write_failed(
                self.field.declaring_type(),
                self.field.field_name(),
                "nested object fields hold no column value",
            )),
        }
    }
}

impl fmt::Debug for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("FieldNode");
        out.field("path", &self.path).field("field", &self.field.field_name());
        match &self.kind {
            NodeKind::Leaf { reader } => out.field("reader", &reader.name()),
            NodeKind::Nest { children, .. } => out.field("children", children),
        };
        out.finish()
    }
}

struct TreeBuilder<'r> {
    registry: &'r ReaderRegistry,
    delimiter: char,
    /// Types from the root down to the entity being scanned.
    lineage: Vec<TypeId>,
}

impl TreeBuilder<'_> {
    fn scan(&mut self, entity: &EntityType, prefix: &str, chain: &[Step]) -> Result<LowerKeyMap<FieldNode>> {
        let mut nodes = LowerKeyMap::new();
        for field in entity.fields() {
            let node = match field.binding() {
                Binding::Column(name) => self.leaf(field, name, prefix, chain),
                Binding::Nest { alias, describe } => self.nest(field, alias, *describe, prefix, chain)?,
                Binding::Unbound => continue,
            };
            if nodes.contains_key(&node.name) {
                debug!("{}: binding '{}' declared twice, keeping the first", entity.name(), node.path);
                continue;
            }
            let key = node.name.clone();
            nodes.insert(&key, node);
        }
        Ok(nodes)
    }

    fn leaf(&self, field: &Arc<FieldDef>, name: &str, prefix: &str, chain: &[Step]) -> FieldNode {
        let reader = self.registry.get_reader(field.target_type());
        let path = self.join(prefix, name);
        trace!("{} -> {} via reader '{}'", path, field.field_name(), reader.name());

        FieldNode {
            name: name.to_string(),
            path,
            field: field.clone(),
            kind: NodeKind::Leaf { reader },
            chain: chain.to_vec(),
        }
    }

    fn nest(
        &mut self,
        field: &Arc<FieldDef>,
        alias: &str,
        describe: fn() -> EntityType,
        prefix: &str,
        chain: &[Step],
    ) -> Result<FieldNode> {
        let nested = Arc::new(describe());
        let path = self.join(prefix, alias);
        if self.lineage.contains(&nested.id()) {
            return Err(MapError::Cycle {
                type_name: field.declaring_type().to_string(),
                path,
            });
        }

        let mut inner_chain = chain.to_vec();
        inner_chain.push(Step {
            field: field.clone(),
            entity: nested.clone(),
        });

        self.lineage.push(nested.id());
        let children = self.scan(&nested, &path, &inner_chain);
        self.lineage.pop();

        Ok(FieldNode {
            name: alias.to_string(),
            path,
            field: field.clone(),
            kind: NodeKind::Nest {
                entity: nested,
                children: children?,
            },
            chain: chain.to_vec(),
        })
    }

    fn join(&self, prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", prefix, self.delimiter, name)
        }
    }
}
