//! Pipeline stages and source slots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the twelve fixed steps of a volume ray-casting shader.
///
/// The declaration order is the logical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Computes ray entry/exit and the number of steps.
    RaySetup,
    /// Shortens the ray against clip planes and the depth buffer.
    ClipRay,
    /// Perturbs the ray start to hide sampling banding.
    JitterPosition,
    /// The sampling loop, invoking the stages below per sample.
    RayTraversal,
    /// Discards samples inside/outside clip volumes.
    ClipPosition,
    /// Higher-order interpolation of the scalar field.
    Reconstruction,
    /// Raw scalar texture fetch.
    FetchScalar,
    /// Turns a scalar and a position into an RGBA contribution.
    Shading,
    /// Maps a scalar to RGBA.
    Classification,
    /// Estimates the scalar field gradient.
    Gradient,
    /// Chooses raw or classified scalars as gradient input.
    GradientInput,
    /// Local lighting model.
    Illumination,
}

impl Stage {
    /// Number of stages.
    pub const COUNT: usize = 12;

    /// All stages in execution order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::RaySetup,
        Stage::ClipRay,
        Stage::JitterPosition,
        Stage::RayTraversal,
        Stage::ClipPosition,
        Stage::Reconstruction,
        Stage::FetchScalar,
        Stage::Shading,
        Stage::Classification,
        Stage::Gradient,
        Stage::GradientInput,
        Stage::Illumination,
    ];

    /// All stages in source emission order: the reverse of execution order,
    /// so functions are defined before the stages that call them.
    pub const EMISSION_ORDER: [Stage; Stage::COUNT] = [
        Stage::Illumination,
        Stage::GradientInput,
        Stage::Gradient,
        Stage::Classification,
        Stage::Shading,
        Stage::FetchScalar,
        Stage::Reconstruction,
        Stage::ClipPosition,
        Stage::RayTraversal,
        Stage::JitterPosition,
        Stage::ClipRay,
        Stage::RaySetup,
    ];

    /// Position of this stage in execution order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snake-case name, also the template file stem of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::RaySetup => "ray_setup",
            Stage::ClipRay => "clip_ray",
            Stage::JitterPosition => "jitter_position",
            Stage::RayTraversal => "ray_traversal",
            Stage::ClipPosition => "clip_position",
            Stage::Reconstruction => "reconstruction",
            Stage::FetchScalar => "fetch_scalar",
            Stage::Shading => "shading",
            Stage::Classification => "classification",
            Stage::Gradient => "gradient",
            Stage::GradientInput => "gradient_input",
            Stage::Illumination => "illumination",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where a piece of shader text goes in the assembled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSlot {
    VertexHeader,
    VertexBody,
    FragmentHeader,
    FragmentBody,
}

impl SourceSlot {
    /// Name the templates switch on.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceSlot::VertexHeader => "vertex_header",
            SourceSlot::VertexBody => "vertex_body",
            SourceSlot::FragmentHeader => "fragment_header",
            SourceSlot::FragmentBody => "fragment_body",
        }
    }
}
