//! Function Registry
//!
//! Stable name → (stage, parameterization, factory) catalogue. It replaces
//! runtime class lookup: the compositor resolves every built-in name once at
//! construction and afterwards only deals with compact [`VariantId`]s.
//!
//! A registry is mutable until it is handed to a compositor:
//!
//! ```rust,ignore
//! let mut registry = FunctionRegistry::builtin();
//! // Custom implementation under a built-in name
//! registry.register("ShadingLighting", Stage::Shading, Parameterization::Fixed(TemplateParams::NONE), |_| {
//!     Box::new(MyToonShading)
//! })?;
//! let compositor = Compositor::<MyBackend>::with_registry(settings, registry);
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use crate::compositor::stage::Stage;
use crate::errors::{CompositorError, Result};
use crate::functions::{BuiltinVariant, Parameterization, ShaderFunction, TemplateParams};

/// Creates a shader function instance for the given template parameters.
pub type FunctionFactory = Box<dyn Fn(TemplateParams) -> Box<dyn ShaderFunction> + Send + Sync>;

/// Compact, stable identifier of a registry entry (registration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantId(u16);

impl VariantId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u16 {
        self.0
    }
}

pub struct RegistryEntry {
    pub name: String,
    pub stage: Stage,
    pub parameterization: Parameterization,
    factory: FunctionFactory,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("stage", &self.stage)
            .field("parameterization", &self.parameterization)
            .finish_non_exhaustive()
    }
}

/// Catalogue of all shader function variants a compositor may select.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    /// Removed entries leave a hole so later ids stay stable.
    entries: Vec<Option<RegistryEntry>>,
    by_name: FxHashMap<String, VariantId>,
}

impl FunctionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in variant.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &variant in BuiltinVariant::ALL {
            let registered = registry.register(
                variant.name(),
                variant.stage(),
                variant.parameterization(),
                move |params| variant.instantiate(params),
            );
            if let Err(e) = registered {
                log::error!("Failed to register built-in variant '{variant}': {e}");
            }
        }
        registry
    }

    /// Registers a variant. Registering an existing name replaces the entry
    /// and keeps its id. New names fail once every `u16` id is taken.
    pub fn register<F>(
        &mut self,
        name: &str,
        stage: Stage,
        parameterization: Parameterization,
        factory: F,
    ) -> Result<VariantId>
    where
        F: Fn(TemplateParams) -> Box<dyn ShaderFunction> + Send + Sync + 'static,
    {
        let entry = RegistryEntry {
            name: name.to_string(),
            stage,
            parameterization,
            factory: Box::new(factory),
        };

        if let Some(&id) = self.by_name.get(name) {
            log::debug!("Replacing shader function variant '{name}'");
            self.entries[id.index()] = Some(entry);
            return Ok(id);
        }

        let index = u16::try_from(self.entries.len())
            .map_err(|_| CompositorError::RegistryFull(self.entries.len()))?;
        let id = VariantId(index);
        self.entries.push(Some(entry));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Removes a variant. Identities selecting it become invalid.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(id) => {
                self.entries[id.index()] = None;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<VariantId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn entry(&self, id: VariantId) -> Option<&RegistryEntry> {
        self.entries.get(id.index()).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn name(&self, id: VariantId) -> Option<&str> {
        self.entry(id).map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn stage(&self, id: VariantId) -> Option<Stage> {
        self.entry(id).map(|entry| entry.stage)
    }

    /// Creates a new instance with the entry's normalized parameters.
    #[must_use]
    pub fn instantiate(&self, id: VariantId, params: TemplateParams) -> Option<Box<dyn ShaderFunction>> {
        self.entry(id)
            .map(|entry| (entry.factory)(entry.parameterization.normalize(params)))
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Built-in variants resolved once against a registry, indexed by
/// [`BuiltinVariant::index`].
#[derive(Debug, Clone)]
pub struct VariantTable {
    ids: Vec<Option<VariantId>>,
}

impl VariantTable {
    #[must_use]
    pub fn resolve(registry: &FunctionRegistry) -> Self {
        let ids = BuiltinVariant::ALL
            .iter()
            .map(|variant| {
                let id = registry.resolve(variant.name());
                if id.is_none() {
                    log::debug!("Built-in variant '{variant}' is not registered");
                }
                id
            })
            .collect();
        Self { ids }
    }

    /// `None` when the registry has no entry of that name.
    #[inline]
    #[must_use]
    pub fn get(&self, variant: BuiltinVariant) -> Option<VariantId> {
        self.ids.get(variant.index()).copied().flatten()
    }
}
