//! Composition Identity
//!
//! The cache key of a compiled program: shader language, the variant chosen
//! for each of the twelve stages and the Clip Ray template parameters.
//!
//! A 32-bit xxh32 checksum of the content is used as the hash. It is derived
//! from variant ids and the language *name*, so it is stable across runs
//! for the same registry. Equality always compares the full structure as
//! well, so a checksum collision can never alias two compositions.

use std::fmt;
use std::hash::{Hash, Hasher};

use xxhash_rust::xxh32::xxh32;

use super::registry::{FunctionRegistry, VariantId};
use super::stage::Stage;
use crate::functions::TemplateParams;
use crate::utils::interner::{self, Symbol};

/// Seed of the identity checksum.
const CHECKSUM_SEED: u32 = 0x5643_4F4D;

/// Marker written for a stage without a variant.
const NO_VARIANT: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionId {
    language: Option<Symbol>,
    stages: [Option<VariantId>; Stage::COUNT],
    clip_params: TemplateParams,
    /// Cleared by every setter.
    checksum: Option<u32>,
}

impl CompositionId {
    /// An empty (invalid) identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Field access
    // ------------------------------------------------------------------------

    pub fn set_language(&mut self, language: Symbol) {
        self.language = Some(language);
        self.checksum = None;
    }

    #[must_use]
    pub fn language(&self) -> Option<Symbol> {
        self.language
    }

    /// Language name, empty if unset.
    #[must_use]
    pub fn language_name(&self) -> &'static str {
        self.language.map_or("", interner::resolve)
    }

    pub fn set_stage(&mut self, stage: Stage, variant: Option<VariantId>) {
        self.stages[stage.index()] = variant;
        self.checksum = None;
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<VariantId> {
        self.stages[stage.index()]
    }

    /// Clip Ray template parameters.
    pub fn set_clip_params(&mut self, params: TemplateParams) {
        self.clip_params = params;
        self.checksum = None;
    }

    #[must_use]
    pub fn clip_params(&self) -> TemplateParams {
        self.clip_params
    }

    // ------------------------------------------------------------------------
    // Checksum
    // ------------------------------------------------------------------------

    /// Computes and stores the checksum.
    pub fn calculate_checksum(&mut self) -> u32 {
        let checksum = self.compute_checksum();
        self.checksum = Some(checksum);
        checksum
    }

    /// The stored checksum, or a freshly computed one after a field change.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum.unwrap_or_else(|| self.compute_checksum())
    }

    fn compute_checksum(&self) -> u32 {
        let mut bytes = Vec::with_capacity(32 + Stage::COUNT * 2);
        bytes.extend_from_slice(self.language_name().as_bytes());
        bytes.push(0);
        for variant in &self.stages {
            let raw = variant.map_or(NO_VARIANT, VariantId::raw);
            bytes.extend_from_slice(&raw.to_le_bytes());
        }
        bytes.push(self.clip_params.num_clip_planes);
        bytes.push(self.clip_params.num_depth_textures);
        xxh32(&bytes, CHECKSUM_SEED)
    }

    #[cfg(test)]
    pub(crate) fn with_forced_checksum(mut self, checksum: u32) -> Self {
        self.checksum = Some(checksum);
        self
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Stages whose variant is missing, unknown to `registry`, registered for
    /// another stage, or (Clip Ray) paired with parameters the variant does
    /// not accept.
    #[must_use]
    pub fn unresolved_stages(&self, registry: &FunctionRegistry) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|&stage| {
                let Some(entry) = self.stage(stage).and_then(|id| registry.entry(id)) else {
                    return true;
                };
                if entry.stage != stage {
                    return true;
                }
                stage == Stage::ClipRay && !entry.parameterization.accepts(self.clip_params)
            })
            .collect()
    }

    #[must_use]
    pub fn is_valid(&self, registry: &FunctionRegistry) -> bool {
        self.language.is_some() && self.unresolved_stages(registry).is_empty()
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.language == other.language
            && self.stages == other.stages
            && self.clip_params == other.clip_params
    }

    /// Human-readable rendering with variant names.
    #[must_use]
    pub fn display<'a>(&'a self, registry: &'a FunctionRegistry) -> CompositionIdDisplay<'a> {
        CompositionIdDisplay { id: self, registry }
    }
}

impl PartialEq for CompositionId {
    fn eq(&self, other: &Self) -> bool {
        self.checksum() == other.checksum() && self.structurally_eq(other)
    }
}

impl Eq for CompositionId {}

impl Hash for CompositionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.checksum());
    }
}

pub struct CompositionIdDisplay<'a> {
    id: &'a CompositionId,
    registry: &'a FunctionRegistry,
}

impl fmt::Display for CompositionIdDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let language = match self.id.language_name() {
            "" => "<none>",
            name => name,
        };
        writeln!(f, "Composition [{language}] checksum={:#010x}", self.id.checksum())?;
        for stage in Stage::ALL {
            let name = self
                .id
                .stage(stage)
                .and_then(|variant| self.registry.name(variant))
                .unwrap_or("<unresolved>");
            if stage == Stage::ClipRay {
                writeln!(f, "  {stage:<16} {name} ({})", self.id.clip_params)?;
            } else {
                writeln!(f, "  {stage:<16} {name}")?;
            }
        }
        Ok(())
    }
}
