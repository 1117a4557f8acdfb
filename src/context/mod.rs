//! Process-scoped mapping state: the active reader registry and the mappers
//! already built from it.

mod config;

pub use config::MapperConfig;

use crate::core::Result;
use crate::entity::Entity;
use crate::mapper::{AnnotationMapper, PropertyMapper};
use crate::reader::{ReaderProvider, ReaderRegistry};
use lazy_static::lazy_static;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{Level, event, info_span};

lazy_static! {
    static ref GLOBAL_CONTEXT: MapperContext = MapperContext::new(MapperConfig::default());
}

type MapperCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Holds the active [`ReaderRegistry`] and caches one mapper per mapper type
/// (and so per target type).
///
/// Building a mapper resolves every field's reader, so mappers are built once
/// and shared. Two threads asking for the same uncached mapper may both build
/// it; the first one stored wins and both callers get that one.
pub struct MapperContext {
    config: MapperConfig,
    registry: RwLock<Arc<ReaderRegistry>>,
    mappers: RwLock<MapperCache>,
}

impl MapperContext {
    pub fn new(config: MapperConfig) -> Self {
        Self::with_registry(config, ReaderRegistry::new())
    }

    pub fn with_registry(config: MapperConfig, registry: ReaderRegistry) -> Self {
        Self {
            config,
            registry: RwLock::new(Arc::new(registry)),
            mappers: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide context used by `AnnotationMapper::instance` and
    /// `PropertyMapper::instance`.
    pub fn global() -> &'static MapperContext {
        &GLOBAL_CONTEXT
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn active_registry(&self) -> Result<Arc<ReaderRegistry>> {
        Ok(self.registry.read()?.clone())
    }

    /// Installs `registry` as the active one. Mappers cached so far were
    /// built against the previous registry and are dropped.
    pub fn register(&self, registry: ReaderRegistry) -> Result<()> {
        let mut active = self.registry.write()?;
        *active = Arc::new(registry);
        let mut mappers = self.mappers.write()?;
        event!(Level::DEBUG, dropped = mappers.len(), "reader registry replaced");
        mappers.clear();
        Ok(())
    }

    pub fn register_provider(&self, provider: &dyn ReaderProvider) -> Result<()> {
        self.register(ReaderRegistry::from_provider(provider))
    }

    pub fn annotation_mapper<T: Entity>(&self) -> Result<Arc<AnnotationMapper<T>>> {
        self.cached(|registry, config| AnnotationMapper::with_registry(registry, config))
    }

    pub fn property_mapper<T: Entity>(&self) -> Result<Arc<PropertyMapper<T>>> {
        self.cached(|registry, config| Ok(PropertyMapper::with_registry(registry, config)))
    }

    /// Number of cached mappers.
    pub fn cached_mappers(&self) -> Result<usize> {
        Ok(self.mappers.read()?.len())
    }

    fn cached<M, B>(&self, build: B) -> Result<Arc<M>>
    where
        M: Any + Send + Sync,
        B: FnOnce(&ReaderRegistry, &MapperConfig) -> Result<M>,
    {
        let key = TypeId::of::<M>();
        if let Some(entry) = self.mappers.read()?.get(&key) {
            if let Ok(mapper) = entry.clone().downcast::<M>() {
                return Ok(mapper);
            }
        }

        let registry = self.active_registry()?;
        let built = {
            let span = info_span!("mapper.build", mapper = std::any::type_name::<M>());
            let _enter = span.enter();
            Arc::new(build(&*registry, &self.config)?)
        };

        // Same lock order as `register`: registry first, then the cache.
        let active = self.registry.read()?;
        let mut mappers = self.mappers.write()?;
        if !Arc::ptr_eq(&registry, &*active) {
            event!(Level::DEBUG, mapper = std::any::type_name::<M>(), "registry replaced during build, not caching");
            return Ok(built);
        }
        let entry = mappers
            .entry(key)
            .or_insert_with(|| built.clone() as Arc<dyn Any + Send + Sync>)
            .clone();
        Ok(entry.downcast::<M>().unwrap_or(built))
    }
}

impl Default for MapperContext {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}
