//! Formatter registry and resolver chain
//!
//! The registry maps a type to its formatter: an ordered chain of
//! [`ResolverLayer`]s queried in priority order, a per-type memo cache, and
//! (unless disabled) a static-synthesis fallback through
//! [`WireType::formatter`]. Registered layers always win over synthesis,
//! so callers can override any built-in encoding.
//!
//! The cache tolerates first-resolution races: several threads may each
//! construct a formatter for the same type, the first published slot wins,
//! and every caller observes that singleton afterward.

use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use packforge_core::FormatterNotFound;

use crate::formatter::{Formatter, WireType};

/// Type-erased cached formatter handle.
///
/// Internally an `Arc<dyn Any>` whose concrete payload is the
/// `Arc<dyn Formatter<T>>` it was built from; `get` recovers the typed
/// handle by downcast.
#[derive(Clone)]
pub struct FormatterSlot(Arc<dyn Any + Send + Sync>);

impl FormatterSlot {
    /// Erase a typed formatter handle
    pub fn new<T: 'static>(formatter: Arc<dyn Formatter<T>>) -> Self {
        FormatterSlot(Arc::new(formatter))
    }

    fn get<T: 'static>(&self) -> Option<Arc<dyn Formatter<T>>> {
        self.0.downcast_ref::<Arc<dyn Formatter<T>>>().cloned()
    }
}

impl std::fmt::Debug for FormatterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FormatterSlot")
    }
}

/// One member of the registry's ordered lookup chain
pub trait ResolverLayer: Send + Sync {
    /// The formatter this layer provides for `ty`, if any
    fn resolve(&self, ty: TypeId) -> Option<FormatterSlot>;
}

/// A populate-then-freeze resolver layer backed by a type-id map.
///
/// Register formatters while building, then hand the layer to a registry;
/// the map is never mutated afterward.
#[derive(Default)]
pub struct LayerMap {
    entries: HashMap<TypeId, FormatterSlot>,
}

impl LayerMap {
    /// Create an empty layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `formatter` for `T`, replacing any previous registration
    pub fn register<T: 'static>(&mut self, formatter: Arc<dyn Formatter<T>>) {
        self.entries
            .insert(TypeId::of::<T>(), FormatterSlot::new(formatter));
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResolverLayer for LayerMap {
    fn resolve(&self, ty: TypeId) -> Option<FormatterSlot> {
        self.entries.get(&ty).cloned()
    }
}

/// Immutable type-to-formatter mapping with layered overrides.
///
/// Constructed once, then shared (`Send + Sync`); lookups after the first
/// resolution of a type are lock-free cache reads.
pub struct FormatterRegistry {
    layers: Vec<Arc<dyn ResolverLayer>>,
    cache: DashMap<TypeId, FormatterSlot>,
    synthesize: bool,
}

impl FormatterRegistry {
    /// The standard registry: no override layers, static synthesis for
    /// every [`WireType`]
    pub fn standard() -> Self {
        Self::with_layers(Vec::new())
    }

    /// Override layers in priority order, with static synthesis as the
    /// final fallback
    pub fn with_layers(layers: Vec<Arc<dyn ResolverLayer>>) -> Self {
        FormatterRegistry {
            layers,
            cache: DashMap::new(),
            synthesize: true,
        }
    }

    /// Explicit layers only, no synthesis fallback: types no layer knows
    /// fail with [`FormatterNotFound`] at lookup time
    pub fn from_layers(layers: Vec<Arc<dyn ResolverLayer>>) -> Self {
        FormatterRegistry {
            layers,
            cache: DashMap::new(),
            synthesize: false,
        }
    }

    /// Resolve the formatter for `T`.
    ///
    /// Order: memo cache, then each layer in priority order, then (when
    /// enabled) `T::formatter()` synthesis. The resolved slot is published
    /// to the cache; under a race the first publication wins.
    pub fn formatter<T: WireType>(&self) -> Result<Arc<dyn Formatter<T>>, FormatterNotFound> {
        let ty = TypeId::of::<T>();
        if let Some(slot) = self.cache.get(&ty) {
            return slot.get::<T>().ok_or_else(Self::not_found::<T>);
        }
        if let Some(slot) = self.resolve_from_layers(ty) {
            let published = self.cache.entry(ty).or_insert(slot);
            return published.get::<T>().ok_or_else(Self::not_found::<T>);
        }
        if self.synthesize {
            tracing::trace!(type_name = type_name::<T>(), "synthesizing formatter");
            let slot = FormatterSlot::new(T::formatter());
            let published = self.cache.entry(ty).or_insert(slot);
            return published.get::<T>().ok_or_else(Self::not_found::<T>);
        }
        Err(Self::not_found::<T>())
    }

    /// Resolve only through the cache and layers, never synthesizing.
    ///
    /// Usable with types that carry no [`WireType`] impl, at the cost of
    /// failing for anything unregistered.
    pub fn registered_formatter<T: 'static>(
        &self,
    ) -> Result<Arc<dyn Formatter<T>>, FormatterNotFound> {
        let ty = TypeId::of::<T>();
        if let Some(slot) = self.cache.get(&ty) {
            return slot.get::<T>().ok_or_else(Self::not_found::<T>);
        }
        match self.resolve_from_layers(ty) {
            Some(slot) => {
                let published = self.cache.entry(ty).or_insert(slot);
                published.get::<T>().ok_or_else(Self::not_found::<T>)
            }
            None => Err(Self::not_found::<T>()),
        }
    }

    fn resolve_from_layers(&self, ty: TypeId) -> Option<FormatterSlot> {
        self.layers.iter().find_map(|layer| layer.resolve(ty))
    }

    fn not_found<T>() -> FormatterNotFound {
        FormatterNotFound {
            type_name: type_name::<T>(),
        }
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("layers", &self.layers.len())
            .field("cached_types", &self.cache.len())
            .field("synthesize", &self.synthesize)
            .finish()
    }
}
