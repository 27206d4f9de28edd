//! Function & Composition Caches
//!
//! Two arena-backed caches, both owned by the compositor:
//!
//! - [`FunctionCache`]: shader function instances, deduplicated by
//!   (variant, template parameters)
//! - [`CompositionCache`]: linked programs, deduplicated by
//!   [`CompositionId`]
//!
//! Compositions refer to function instances by [`FunctionKey`] and never own
//! them. Clearing removes compositions first, then instances; both arenas
//! bump their generations so every previously handed out key resolves to
//! nothing afterwards.

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use super::composition::ShaderComposition;
use super::identity::CompositionId;
use super::registry::{FunctionRegistry, VariantId};
use crate::functions::{ShaderFunction, TemplateParams};

new_key_type! {
    /// Handle of a cached shader function instance.
    pub struct FunctionKey;
    /// Handle of a cached shader composition.
    pub struct CompositionKey;
}

// ─── Function Cache ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FunctionCache {
    functions: SlotMap<FunctionKey, Box<dyn ShaderFunction>>,
    lookup: FxHashMap<(VariantId, TemplateParams), FunctionKey>,
}

impl FunctionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared instance of `variant`, creating it on first use.
    ///
    /// Parameters are normalized to the variant's parameterization first, so
    /// fixed variants share one instance regardless of the requested counts.
    /// `None` if the registry does not know `variant`.
    pub fn get_or_create(
        &mut self,
        registry: &FunctionRegistry,
        variant: VariantId,
        params: TemplateParams,
    ) -> Option<FunctionKey> {
        let entry = registry.entry(variant)?;
        let params = entry.parameterization.normalize(params);

        if let Some(&key) = self.lookup.get(&(variant, params)) {
            return Some(key);
        }

        let function = registry.instantiate(variant, params)?;
        log::trace!("New shader function instance {} ({params})", entry.name);
        let key = self.functions.insert(function);
        self.lookup.insert((variant, params), key);
        Some(key)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: FunctionKey) -> Option<&dyn ShaderFunction> {
        self.functions.get(key).map(|function| &**function)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn clear(&mut self) {
        self.lookup.clear();
        self.functions.clear();
    }
}

// ─── Composition Cache ───────────────────────────────────────────────────────

pub struct CompositionCache<P> {
    compositions: SlotMap<CompositionKey, ShaderComposition<P>>,
    lookup: FxHashMap<CompositionId, CompositionKey>,
}

impl<P> Default for CompositionCache<P> {
    fn default() -> Self {
        Self {
            compositions: SlotMap::with_key(),
            lookup: FxHashMap::default(),
        }
    }
}

impl<P> CompositionCache<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the composition registered under `id`.
    #[inline]
    #[must_use]
    pub fn find(&self, id: &CompositionId) -> Option<CompositionKey> {
        self.lookup.get(id).copied()
    }

    /// Registers `composition` under its own identity. An existing entry for
    /// the same identity is replaced and its program dropped.
    pub fn insert(&mut self, composition: ShaderComposition<P>) -> CompositionKey {
        let id = *composition.id();
        if let Some(old) = self.lookup.remove(&id) {
            self.compositions.remove(old);
        }
        let key = self.compositions.insert(composition);
        self.lookup.insert(id, key);
        key
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: CompositionKey) -> Option<&ShaderComposition<P>> {
        self.compositions.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: CompositionKey) -> Option<&mut ShaderComposition<P>> {
        self.compositions.get_mut(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.compositions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compositions.is_empty()
    }

    /// Drops every composition and its program.
    pub fn clear(&mut self) {
        self.lookup.clear();
        self.compositions.clear();
    }
}
