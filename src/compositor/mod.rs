//! Shader Compositor
//!
//! Per draw call, the [`Compositor`]:
//!
//! 1. gathers a [`DrawContext`] from the scene and resource collaborators,
//! 2. chooses one variant per [`Stage`] ([`selection`]),
//! 3. builds a [`CompositionId`] and looks it up in the composition cache,
//! 4. on a miss, assembles, compiles and links a new program ([`assembly`]),
//! 5. activates the program and lets every function bind its parameters.
//!
//! ```rust,ignore
//! let mut compositor = Compositor::<GlBackend>::new(CompositorSettings::default());
//! let request = DrawRequest {
//!     volume: &volume_settings,
//!     scene: &scene,
//!     resources: &volume_resources,
//!     transforms,
//! };
//! match compositor.prepare_draw(&mut backend, &request) {
//!     Ok(_) => draw_proxy_geometry(),
//!     Err(e) => log::warn!("Skipping volume: {e}"),
//! }
//! ```
//!
//! The compositor is single-threaded; every mutating operation takes
//! `&mut self`.

pub mod assembly;
pub mod cache;
pub mod composition;
pub mod context;
pub mod identity;
pub mod registry;
pub mod selection;
pub mod stage;

use std::fmt;

use crate::backend::ShaderBackend;
use crate::errors::{CompositorError, Result};
use crate::scene::{DrawTransforms, SceneQuery, VolumeResources};
use crate::settings::{CompositorSettings, VolumeSettings};
use crate::utils::interner::{self, Symbol};

pub use cache::{CompositionKey, FunctionKey};
pub use composition::ShaderComposition;
pub use context::DrawContext;
pub use identity::CompositionId;
pub use registry::{FunctionRegistry, VariantId};
pub use selection::VariantChoices;
pub use stage::{SourceSlot, Stage};

use cache::{CompositionCache, FunctionCache};
use registry::VariantTable;

/// Everything outside the compositor that one volume draw call depends on.
#[derive(Clone, Copy)]
pub struct DrawRequest<'a> {
    pub volume: &'a VolumeSettings,
    pub scene: &'a dyn SceneQuery,
    pub resources: &'a dyn VolumeResources,
    pub transforms: DrawTransforms,
}

/// Result of the selection step.
#[derive(Debug, Clone)]
pub struct Selection {
    pub id: CompositionId,
    pub choices: VariantChoices,
    pub context: DrawContext,
}

/// Cache counters since construction (not reset by clearing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Programs compiled and linked successfully.
    pub compiled: u64,
    /// Compile or link attempts the backend rejected.
    pub failed: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} compiled={} failed={}",
            self.hits, self.misses, self.compiled, self.failed
        )
    }
}

pub struct Compositor<B: ShaderBackend> {
    settings: CompositorSettings,
    registry: FunctionRegistry,
    /// Built-in variants resolved once against `registry`.
    variants: VariantTable,
    functions: FunctionCache,
    compositions: CompositionCache<B::Program>,
    stats: CacheStats,
}

impl<B: ShaderBackend> Compositor<B> {
    /// A compositor over the built-in variant catalogue.
    #[must_use]
    pub fn new(settings: CompositorSettings) -> Self {
        Self::with_registry(settings, FunctionRegistry::builtin())
    }

    /// A compositor over a customized registry. The registry is read-only
    /// from here on.
    #[must_use]
    pub fn with_registry(settings: CompositorSettings, registry: FunctionRegistry) -> Self {
        let variants = VariantTable::resolve(&registry);
        Self {
            settings,
            registry,
            variants,
            functions: FunctionCache::new(),
            compositions: CompositionCache::new(),
            stats: CacheStats::default(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// Replaces the settings. Cached compositions stay valid: everything a
    /// setting influences is part of the composition identity.
    pub fn set_settings(&mut self, settings: CompositorSettings) {
        self.settings = settings;
    }

    #[must_use]
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Resolves the shader language: the explicit setting, else the
    /// backend's default.
    fn resolve_language(&self, backend: &B) -> Result<Symbol> {
        let name = match self.settings.shader_language.as_deref() {
            Some(name) => name,
            None => backend
                .default_language()
                .ok_or(CompositorError::NoDefaultShaderLanguage)?,
        };
        if !backend.supports_language(name) {
            return Err(CompositorError::UnknownShaderLanguage(name.to_string()));
        }
        Ok(interner::intern(name))
    }

    /// Gathers the draw context and translates it into a composition
    /// identity. Issues only the queries the current flags allow and has no
    /// other side effects.
    pub fn select(&self, backend: &B, request: &DrawRequest<'_>) -> Result<Selection> {
        let language = self.resolve_language(backend)?;

        let context = DrawContext::gather(
            &self.settings,
            request.volume,
            request.scene,
            request.resources,
            &request.transforms,
        );
        let choices = selection::choose_variants(&self.settings, request.volume, &context);

        let mut id = CompositionId::new();
        id.set_language(language);
        for stage in Stage::ALL {
            id.set_stage(stage, self.variants.get(choices.get(stage)));
        }
        id.set_clip_params(choices.clip_params);
        id.calculate_checksum();

        Ok(Selection {
            id,
            choices,
            context,
        })
    }

    // ========================================================================
    // Composition lookup & creation
    // ========================================================================

    /// Returns the composition registered under `id`, compiling it first if
    /// needed. Invalid identities and backend failures are errors and leave
    /// the cache untouched.
    pub fn get_or_create(&mut self, backend: &mut B, id: &CompositionId) -> Result<CompositionKey> {
        if let Some(key) = self.compositions.find(id) {
            self.stats.hits += 1;
            log::trace!("Composition cache hit ({:#010x})", id.checksum());
            return Ok(key);
        }
        self.stats.misses += 1;

        let composition = self.generate(backend, id)?;
        let key = self.compositions.insert(composition);
        log::debug!(
            "Registered composition {:#010x} ({} cached)",
            id.checksum(),
            self.compositions.len()
        );
        Ok(key)
    }

    /// Assembles, compiles and links the program of `id` without
    /// registering it.
    fn generate(&mut self, backend: &mut B, id: &CompositionId) -> Result<ShaderComposition<B::Program>> {
        let unresolved = id.unresolved_stages(&self.registry);
        if id.language().is_none() || !unresolved.is_empty() {
            log::warn!("Invalid composition identity:\n{}", id.display(&self.registry));
            return Err(CompositorError::InvalidComposition { stages: unresolved });
        }

        let mut functions = [FunctionKey::default(); Stage::COUNT];
        for stage in Stage::ALL {
            let key = id.stage(stage).and_then(|variant| {
                self.functions
                    .get_or_create(&self.registry, variant, id.clip_params())
            });
            functions[stage.index()] =
                key.ok_or_else(|| CompositorError::InvalidComposition { stages: vec![stage] })?;
        }

        let language = id.language_name();
        let sources = assembly::assemble(&self.functions, &functions, language)?;
        let (vertex_profile, fragment_profile) = assembly::profiles(language);

        let program = match Self::compile(
            backend,
            language,
            &sources,
            &vertex_profile,
            &fragment_profile,
        ) {
            Ok(program) => program,
            Err(e) => {
                self.stats.failed += 1;
                log::warn!("{e}\n{}", id.display(&self.registry));
                return Err(e);
            }
        };
        self.stats.compiled += 1;

        let composition = ShaderComposition::new(*id, program, functions, sources.vertex, sources.fragment);
        if self.settings.dump_sources {
            log::trace!("{}", composition.dump(&self.registry));
        }
        Ok(composition)
    }

    fn compile(
        backend: &mut B,
        language: &str,
        sources: &assembly::AssembledSources,
        vertex_profile: &str,
        fragment_profile: &str,
    ) -> Result<B::Program> {
        let vertex = backend
            .compile_vertex_shader(language, &sources.vertex, vertex_profile)
            .ok_or_else(|| CompositorError::VertexShaderCompilation {
                language: language.to_string(),
            })?;
        let fragment = backend
            .compile_fragment_shader(language, &sources.fragment, fragment_profile)
            .ok_or_else(|| CompositorError::FragmentShaderCompilation {
                language: language.to_string(),
            })?;
        backend
            .link_program(language, vertex, fragment)
            .ok_or_else(|| CompositorError::ProgramLink {
                language: language.to_string(),
            })
    }

    // ========================================================================
    // Per-draw use
    // ========================================================================

    /// Activates the composition's program and binds its per-draw
    /// parameters. `false` if `key` is stale or activation failed.
    pub fn bind(&mut self, backend: &mut B, key: CompositionKey, ctx: &DrawContext) -> bool {
        let Some(composition) = self.compositions.get_mut(key) else {
            return false;
        };
        if !composition.activate(backend) {
            log::warn!("Backend failed to activate composition {:#010x}", composition.id().checksum());
            return false;
        }
        composition.bind(&self.functions, ctx);
        true
    }

    /// Full per-draw path: select, look up or compile, activate and bind.
    /// The composition stays cached when only activation fails.
    pub fn prepare_draw(&mut self, backend: &mut B, request: &DrawRequest<'_>) -> Result<CompositionKey> {
        let selection = self.select(backend, request)?;
        let key = self.get_or_create(backend, &selection.id)?;
        if !self.bind(backend, key, &selection.context) {
            return Err(CompositorError::Activation {
                checksum: selection.id.checksum(),
            });
        }
        Ok(key)
    }

    // ========================================================================
    // Cache access
    // ========================================================================

    #[must_use]
    pub fn composition(&self, key: CompositionKey) -> Option<&ShaderComposition<B::Program>> {
        self.compositions.get(key)
    }

    #[must_use]
    pub fn find(&self, id: &CompositionId) -> Option<CompositionKey> {
        self.compositions.find(id)
    }

    /// Diagnostic dump of a cached composition.
    #[must_use]
    pub fn dump(&self, key: CompositionKey) -> Option<String> {
        self.compositions
            .get(key)
            .map(|composition| composition.dump(&self.registry))
    }

    /// Destroys every composition (releasing its program), then every
    /// function instance. All previously returned keys become stale.
    pub fn clear_cache(&mut self) {
        let compositions = self.compositions.len();
        let functions = self.functions.len();
        self.compositions.clear();
        self.functions.clear();
        log::info!("Cleared {compositions} compositions and {functions} shader functions");
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub fn num_compositions(&self) -> usize {
        self.compositions.len()
    }

    #[must_use]
    pub fn num_functions(&self) -> usize {
        self.functions.len()
    }
}

impl<B: ShaderBackend> fmt::Debug for Compositor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("settings", &self.settings)
            .field("compositions", &self.compositions.len())
            .field("functions", &self.functions.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
