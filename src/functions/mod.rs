//! Shader Functions
//!
//! A shader function is one algorithmic fragment implementing a single
//! pipeline [`Stage`]. Every stage has several interchangeable variants; a
//! composition picks exactly one per stage.
//!
//! - [`ShaderFunction`]: the polymorphic contract (source emission + per-draw binding)
//! - [`StageKind`]: per-stage variant enums, one module per stage
//! - [`BuiltinVariant`]: the flat catalogue of every built-in variant, used to
//!   seed the [`FunctionRegistry`](crate::compositor::registry::FunctionRegistry)
//!   and as the index of the compositor's lookup table
//! - [`templates`]: the embedded per-stage template catalogue
//!
//! Functions are stateless. All per-draw data arrives through the
//! [`DrawContext`] when the composition binds its parameters.

use std::fmt;

use serde::Serialize;

use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::{SourceSlot, Stage};
use crate::errors::Result;

pub mod templates;

pub mod classification;
pub mod clip_position;
pub mod clip_ray;
pub mod fetch_scalar;
pub mod gradient;
pub mod gradient_input;
pub mod illumination;
pub mod jitter_position;
pub mod ray_setup;
pub mod ray_traversal;
pub mod reconstruction;
pub mod shading;

pub use classification::{ClassificationFunction, ClassificationKind};
pub use clip_position::{ClipPositionFunction, ClipPositionKind};
pub use clip_ray::{ClipRayFunction, ClipRayKind};
pub use fetch_scalar::{FetchScalarFunction, FetchScalarKind};
pub use gradient::{GradientFunction, GradientKind};
pub use gradient_input::{GradientInputFunction, GradientInputKind};
pub use illumination::{IlluminationFunction, IlluminationKind};
pub use jitter_position::{JitterPositionFunction, JitterPositionKind};
pub use ray_setup::{RaySetupFunction, RaySetupKind};
pub use ray_traversal::{RayTraversalFunction, RayTraversalKind};
pub use reconstruction::{ReconstructionFunction, ReconstructionKind};
pub use shading::{ShadingFunction, ShadingKind};

// ============================================================================
// Template parameters
// ============================================================================

/// Compile-time parameters of a templated variant.
///
/// Only Clip Ray is templated; every other variant uses [`TemplateParams::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TemplateParams {
    pub num_clip_planes: u8,
    pub num_depth_textures: u8,
}

impl TemplateParams {
    pub const NONE: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(num_clip_planes: u8, num_depth_textures: u8) -> Self {
        Self {
            num_clip_planes,
            num_depth_textures,
        }
    }

    /// Builds parameters from runtime counts, saturating at `u8::MAX`.
    #[must_use]
    pub fn from_counts(num_clip_planes: usize, num_depth_textures: usize) -> Self {
        Self {
            num_clip_planes: u8::try_from(num_clip_planes).unwrap_or(u8::MAX),
            num_depth_textures: u8::try_from(num_depth_textures).unwrap_or(u8::MAX),
        }
    }
}

impl fmt::Display for TemplateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "planes={}, depth={}",
            self.num_clip_planes, self.num_depth_textures
        )
    }
}

/// How a variant relates to [`TemplateParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameterization {
    /// Always instantiated with exactly these parameters.
    Fixed(TemplateParams),
    /// Instantiated once per distinct parameter set.
    Templated,
}

impl Parameterization {
    /// Whether an identity may pair this variant with `params`.
    #[must_use]
    pub fn accepts(self, params: TemplateParams) -> bool {
        match self {
            Parameterization::Fixed(fixed) => fixed == params,
            Parameterization::Templated => true,
        }
    }

    /// The parameters an instance is actually created with.
    #[must_use]
    pub fn normalize(self, params: TemplateParams) -> TemplateParams {
        match self {
            Parameterization::Fixed(fixed) => fixed,
            Parameterization::Templated => params,
        }
    }
}

// ============================================================================
// Shader function contract
// ============================================================================

/// One interchangeable algorithm fragment of a volume ray-casting shader.
pub trait ShaderFunction: Send + Sync {
    /// The stage this function implements.
    fn stage(&self) -> Stage;

    /// Variant name inside its stage, selects the template branch.
    fn kind(&self) -> &'static str;

    fn template_params(&self) -> TemplateParams {
        TemplateParams::NONE
    }

    /// Source text for `slot` in `language`. Empty text is valid.
    fn source_code(&self, language: &str, slot: SourceSlot) -> Result<String> {
        templates::render_stage(
            language,
            self.stage(),
            self.kind(),
            slot,
            self.template_params(),
        )
    }

    /// Pushes per-draw parameters into the active program.
    fn set_program(&self, _program: &mut dyn ProgramParameters, _ctx: &DrawContext) {}
}

impl fmt::Debug for dyn ShaderFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderFunction")
            .field("stage", &self.stage())
            .field("kind", &self.kind())
            .field("params", &self.template_params())
            .finish()
    }
}

/// Variant enum of a single stage.
pub trait StageKind: Copy + fmt::Debug + Send + Sync + 'static {
    const STAGE: Stage;

    fn instantiate(self, params: TemplateParams) -> Box<dyn ShaderFunction>;

    fn parameterization(self) -> Parameterization {
        Parameterization::Fixed(TemplateParams::NONE)
    }

    fn stage(self) -> Stage {
        Self::STAGE
    }
}

/// Declares a stage's variant enum together with its template names.
macro_rules! stage_kind {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $str:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $str ),+
                }
            }
        }
    };
}

pub(crate) use stage_kind;

// ============================================================================
// Built-in catalogue
// ============================================================================

macro_rules! builtin_variants {
    ( $( $name:ident => $kind:expr ),+ $(,)? ) => {
        /// Every built-in shader function variant, named by its stable
        /// registry name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BuiltinVariant {
            $( $name ),+
        }

        impl BuiltinVariant {
            pub const ALL: &'static [BuiltinVariant] = &[$( BuiltinVariant::$name ),+];

            pub const COUNT: usize = Self::ALL.len();

            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self as usize
            }

            /// Stable registry name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( BuiltinVariant::$name => stringify!($name) ),+
                }
            }

            #[must_use]
            pub fn stage(self) -> Stage {
                match self {
                    $( BuiltinVariant::$name => StageKind::stage($kind) ),+
                }
            }

            #[must_use]
            pub fn parameterization(self) -> Parameterization {
                match self {
                    $( BuiltinVariant::$name => StageKind::parameterization($kind) ),+
                }
            }

            #[must_use]
            pub fn instantiate(self, params: TemplateParams) -> Box<dyn ShaderFunction> {
                match self {
                    $( BuiltinVariant::$name => StageKind::instantiate($kind, params) ),+
                }
            }
        }
    };
}

builtin_variants! {
    RaySetupNull => RaySetupKind::Null,
    RaySetupColorCube => RaySetupKind::ColorCube,
    RaySetupBoundingBoxIntersection => RaySetupKind::BoundingBoxIntersection,
    RaySetupHybrid => RaySetupKind::Hybrid,

    ClipRayNull => ClipRayKind::Null,
    ClipRayPlane => ClipRayKind::Plane,
    ClipRayDepthTexture => ClipRayKind::DepthTexture,
    ClipRayTemplate => ClipRayKind::Template,

    JitterPositionNull => JitterPositionKind::Null,
    JitterPositionStochastic => JitterPositionKind::Stochastic,
    JitterPositionTrigonometric => JitterPositionKind::Trigonometric,

    RayTraversalNull => RayTraversalKind::Null,
    RayTraversalDebugRayStart => RayTraversalKind::DebugRayStart,
    RayTraversalDebugRayEnd => RayTraversalKind::DebugRayEnd,
    RayTraversalDebugRayDirection => RayTraversalKind::DebugRayDirection,
    RayTraversalDebugRayLength => RayTraversalKind::DebugRayLength,
    RayTraversalIsosurface => RayTraversalKind::Isosurface,
    RayTraversalMip => RayTraversalKind::Mip,
    RayTraversalGmip => RayTraversalKind::Gmip,
    RayTraversalDvrBackToFront => RayTraversalKind::DvrBackToFront,
    RayTraversalDvrFrontToBack => RayTraversalKind::DvrFrontToBack,
    RayTraversalMida => RayTraversalKind::Mida,

    ClipPositionNull => ClipPositionKind::Null,
    ClipPositionBox => ClipPositionKind::Box,
    ClipPositionEllipsoid => ClipPositionKind::Ellipsoid,
    ClipPositionVolumeTexture => ClipPositionKind::VolumeTexture,

    ReconstructionNull => ReconstructionKind::Null,
    ReconstructionTriCubic => ReconstructionKind::TriCubic,
    ReconstructionTriCubicKernel => ReconstructionKind::TriCubicKernel,

    FetchScalarNull => FetchScalarKind::Null,
    FetchScalarSampler2D => FetchScalarKind::Sampler2D,
    FetchScalarSampler2DArray => FetchScalarKind::Sampler2DArray,
    FetchScalarSampler3D => FetchScalarKind::Sampler3D,

    ShadingNull => ShadingKind::Null,
    ShadingDebugScalar => ShadingKind::DebugScalar,
    ShadingDebugPosition => ShadingKind::DebugPosition,
    ShadingDebugClassification => ShadingKind::DebugClassification,
    ShadingDebugGradient => ShadingKind::DebugGradient,
    ShadingDebugNormal => ShadingKind::DebugNormal,
    ShadingDebugViewingDirection => ShadingKind::DebugViewingDirection,
    ShadingDebugLightDirection => ShadingKind::DebugLightDirection,
    ShadingLighting => ShadingKind::Lighting,
    ShadingLightingThreshold => ShadingKind::LightingThreshold,

    ClassificationNull => ClassificationKind::Null,
    ClassificationThreshold => ClassificationKind::Threshold,
    ClassificationTransferFunction => ClassificationKind::TransferFunction,
    ClassificationTransferFunctionPreMultiplied => ClassificationKind::TransferFunctionPreMultiplied,
    ClassificationPreIntegration => ClassificationKind::PreIntegration,

    GradientNull => GradientKind::Null,
    GradientForwardDifferences => GradientKind::ForwardDifferences,
    GradientBackwardDifferences => GradientKind::BackwardDifferences,
    GradientCentralDifferences => GradientKind::CentralDifferences,
    GradientCentralDifferences9 => GradientKind::CentralDifferences9,

    GradientInputNull => GradientInputKind::Null,
    GradientInputScalar => GradientInputKind::Scalar,
    GradientInputClassified => GradientInputKind::Classified,

    IlluminationNull => IlluminationKind::Null,
    IlluminationLambertianReflection => IlluminationKind::LambertianReflection,
    IlluminationBlinnPhong => IlluminationKind::BlinnPhong,
    IlluminationCookTorrance => IlluminationKind::CookTorrance,
}

impl BuiltinVariant {
    /// The built-in "safe default" variant of `stage`.
    #[must_use]
    pub const fn null_of(stage: Stage) -> Self {
        match stage {
            Stage::RaySetup => BuiltinVariant::RaySetupNull,
            Stage::ClipRay => BuiltinVariant::ClipRayNull,
            Stage::JitterPosition => BuiltinVariant::JitterPositionNull,
            Stage::RayTraversal => BuiltinVariant::RayTraversalNull,
            Stage::ClipPosition => BuiltinVariant::ClipPositionNull,
            Stage::Reconstruction => BuiltinVariant::ReconstructionNull,
            Stage::FetchScalar => BuiltinVariant::FetchScalarNull,
            Stage::Shading => BuiltinVariant::ShadingNull,
            Stage::Classification => BuiltinVariant::ClassificationNull,
            Stage::Gradient => BuiltinVariant::GradientNull,
            Stage::GradientInput => BuiltinVariant::GradientInputNull,
            Stage::Illumination => BuiltinVariant::IlluminationNull,
        }
    }
}

impl fmt::Display for BuiltinVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
