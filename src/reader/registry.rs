use super::provider::{ReaderList, ReaderProvider, StandardProvider};
use super::readers::ObjectReader;
use super::{TargetType, ValueReader};
use log::debug;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Ordered set of value readers.
///
/// [`get_reader`](ReaderRegistry::get_reader) returns the first registered
/// reader whose match accepts the target. Registration order is the only
/// tie-break: an earlier, narrower reader shadows a later, broader one. Coded
/// enumerations are resolved before the list is consulted, through a reader
/// built on first request and cached per enumeration type. When nothing
/// matches, the catch-all [`ObjectReader`] is returned.
pub struct ReaderRegistry {
    readers: Vec<Arc<dyn ValueReader>>,
    fallback: Arc<dyn ValueReader>,
    coded: RwLock<HashMap<TypeId, Arc<dyn ValueReader>>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::from_provider(&StandardProvider)
    }

    pub fn from_provider(provider: &dyn ReaderProvider) -> Self {
        let mut list = ReaderList::new();
        provider.register_defaults(&mut list);
        provider.register_temporal(&mut list);
        provider.register(&mut list);
        debug!("Reader registry built with {} readers", list.len());

        Self {
            readers: list.into_inner(),
            fallback: Arc::new(ObjectReader),
            coded: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_reader(&self, target: &TargetType) -> Arc<dyn ValueReader> {
        if let Some(factory) = target.coded_factory() {
            return self.coded_reader(target, factory);
        }

        self.readers
            .iter()
            .find(|reader| reader.matches(target))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn coded_reader(
        &self,
        target: &TargetType,
        factory: fn() -> Arc<dyn ValueReader>,
    ) -> Arc<dyn ValueReader> {
        if let Ok(cache) = self.coded.read() {
            if let Some(reader) = cache.get(&target.id()) {
                return reader.clone();
            }
        }

        let built = factory();
        match self.coded.write() {
            Ok(mut cache) => cache.entry(target.id()).or_insert(built).clone(),
            // A poisoned cache still yields a usable, uncached reader.
            Err(_) => built,
        }
    }

    /// Names of the registered readers in match order, without the fallback.
    pub fn reader_names(&self) -> Vec<&str> {
        self.readers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
