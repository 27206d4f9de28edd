//! Compositor & Volume Settings
//!
//! Two layers of configuration drive the selection policy:
//!
//! - [`CompositorSettings`]: scene-renderer wide switches. Feature flags
//!   suppress whole stages, the rest picks global algorithms.
//! - [`VolumeSettings`]: per-object rendering quality (traversal mode,
//!   reconstruction filter, shading model, ...).
//!
//! Both are plain serde structs with sensible defaults and can be loaded
//! from JSON.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use volume_compositor::settings::{CompositorFlags, CompositorSettings};
//!
//! // Everything enabled, backend's default shader language
//! let settings = CompositorSettings::default();
//!
//! // Cheapest possible composition
//! let settings = CompositorSettings {
//!     flags: CompositorFlags::all(),
//!     ..Default::default()
//! };
//!
//! let settings = CompositorSettings::from_json_str(r#"{ "shader_language": "GLSL" }"#)?;
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

bitflags! {
    /// Explicit suppression switches of the scene renderer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CompositorFlags: u32 {
        const NO_RAY_SETUP              = 1 << 0;
        const NO_CLIP_RAY               = 1 << 1;
        const NO_JITTER_POSITION        = 1 << 2;
        const NO_RAY_TRAVERSAL          = 1 << 3;
        const NO_CLIP_POSITION          = 1 << 4;
        /// Downgrades higher-order reconstruction to trilinear filtering.
        const NO_RECONSTRUCTION         = 1 << 5;
        const NO_FETCH_SCALAR           = 1 << 6;
        /// Also disables lighting as a whole.
        const NO_SHADING                = 1 << 7;
        const NO_CLASSIFICATION         = 1 << 8;
        const NO_GRADIENT               = 1 << 9;
        const NO_GRADIENT_INPUT         = 1 << 10;
        const NO_ILLUMINATION           = 1 << 11;
        const NO_DEPTH_TEXTURE          = 1 << 12;
        const NO_ILLUMINATION_THRESHOLD = 1 << 13;
    }
}

// ---------------------------------------------------------------------------
// Scene renderer algorithms
// ---------------------------------------------------------------------------

/// How ray entry and exit points are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RaySetup {
    Null,
    /// Rasterized color cube (front face positions from an offscreen pass).
    ColorCube,
    /// Analytic ray / bounding box intersection.
    #[default]
    BoundingBoxIntersection,
    /// Color cube for the start, bounding box intersection for the end.
    Hybrid,
}

/// How the ray start is perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JitterPosition {
    Null,
    /// Random texture lookup.
    Stochastic,
    /// Trigonometric hash of the fragment position.
    #[default]
    Trigonometric,
}

/// Scene-renderer wide compositor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorSettings {
    pub flags: CompositorFlags,
    /// Explicit shader language, `None` uses the backend's default.
    pub shader_language: Option<String>,
    pub ray_setup: RaySetup,
    pub jitter_position: JitterPosition,
    /// Ray dithering strength multiplier is applied only when enabled.
    pub dither_ray: bool,
    /// Opacity below which lighting is skipped (0 disables the threshold).
    pub illumination_threshold: f32,
    /// Multiplied with each volume's own sample rate factor.
    pub global_sample_rate_factor: f32,
    /// Added to each volume's own texture LOD.
    pub global_volume_texture_lod: u32,
    /// Log every newly assembled source at trace level.
    pub dump_sources: bool,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            flags: CompositorFlags::empty(),
            shader_language: None,
            ray_setup: RaySetup::default(),
            jitter_position: JitterPosition::default(),
            dither_ray: true,
            illumination_threshold: 0.01,
            global_sample_rate_factor: 1.0,
            global_volume_texture_lod: 0,
            dump_sources: false,
        }
    }
}

impl CompositorSettings {
    /// Parses settings from JSON. Missing fields take their default.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[inline]
    #[must_use]
    pub fn suppresses(&self, flag: CompositorFlags) -> bool {
        self.flags.intersects(flag)
    }
}

// ---------------------------------------------------------------------------
// Per-object quality settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RayTraversal {
    Null,
    DebugRayStart,
    DebugRayEnd,
    DebugRayDirection,
    DebugRayLength,
    /// First-hit ray casting.
    Isosurface,
    /// Maximum intensity projection.
    Mip,
    /// Gradient-magnitude weighted MIP.
    Gmip,
    /// Back-to-front compositing, no early ray termination.
    DvrBackToFront,
    /// Front-to-back compositing with early ray termination.
    #[default]
    DvrFrontToBack,
    /// Maximum intensity difference accumulation.
    Mida,
}

impl RayTraversal {
    /// Compositing traversals where an illumination threshold pays off.
    #[must_use]
    pub fn accumulates_opacity(self) -> bool {
        matches!(
            self,
            RayTraversal::DvrBackToFront | RayTraversal::DvrFrontToBack | RayTraversal::Mida
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Reconstruction {
    /// One unfiltered texture fetch.
    NearestNeighbour,
    /// One hardware filtered texture fetch.
    #[default]
    Trilinear,
    /// Eight fetches, cubic B-spline.
    TriCubic,
    /// Eight fetches plus three kernel texture fetches.
    TriCubicKernel,
}

impl Reconstruction {
    /// Whether the filter needs a dedicated reconstruction function.
    #[must_use]
    pub fn is_higher_order(self) -> bool {
        matches!(self, Reconstruction::TriCubic | Reconstruction::TriCubicKernel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Shading {
    /// Classification result is returned unshaded.
    Null,
    DebugScalar,
    DebugPosition,
    DebugClassification,
    DebugGradient,
    DebugNormal,
    DebugViewingDirection,
    DebugLightDirection,
    #[default]
    Lighting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Classification {
    /// The scalar is returned as gray value.
    Null,
    /// Scalars below the threshold become fully transparent.
    Threshold,
    #[default]
    TransferFunction,
    /// Pre-multiplied transfer function (no color bleeding).
    TransferFunctionPreMultiplied,
    /// Pre-integrated transfer function.
    PreIntegration,
}

impl Classification {
    /// The transfer-function flavor this mode samples, if any.
    #[must_use]
    pub fn transfer_function_flavor(self) -> Option<crate::scene::TransferFunctionFlavor> {
        use crate::scene::TransferFunctionFlavor;

        match self {
            Classification::TransferFunction => Some(TransferFunctionFlavor::Standard),
            Classification::TransferFunctionPreMultiplied => {
                Some(TransferFunctionFlavor::PreMultiplied)
            }
            Classification::PreIntegration => Some(TransferFunctionFlavor::PreIntegrated),
            Classification::Null | Classification::Threshold => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gradient {
    /// Constant up vector.
    Null,
    /// 4 fetches.
    ForwardDifferences,
    /// 4 fetches.
    BackwardDifferences,
    /// 6 fetches.
    #[default]
    CentralDifferences,
    /// 54 fetches, neighbour gradients weighted.
    CentralDifferences9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Illumination {
    Null,
    LambertianReflection,
    #[default]
    BlinnPhong,
    CookTorrance,
}

/// Per-object rendering quality settings of one volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    pub ray_traversal: RayTraversal,
    pub reconstruction: Reconstruction,
    pub shading: Shading,
    pub classification: Classification,
    pub gradient: Gradient,
    pub illumination: Illumination,
    /// Compute gradients from classified instead of raw scalars.
    pub post_classification_gradient: bool,
    /// Object-level lighting switch.
    pub lighting: bool,
    pub sample_rate_factor: f32,
    pub volume_texture_lod: u32,
    /// Cut-off used by threshold classification.
    pub threshold: f32,
    /// Iso value used by isosurface traversal.
    pub isosurface_value: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            ray_traversal: RayTraversal::default(),
            reconstruction: Reconstruction::default(),
            shading: Shading::default(),
            classification: Classification::default(),
            gradient: Gradient::default(),
            illumination: Illumination::default(),
            post_classification_gradient: false,
            lighting: true,
            sample_rate_factor: 1.0,
            volume_texture_lod: 0,
            threshold: 0.5,
            isosurface_value: 0.5,
        }
    }
}

impl VolumeSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
