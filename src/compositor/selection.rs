//! Selection Policy
//!
//! Pure translation of (compositor settings, volume settings, draw context)
//! into one built-in variant per stage. No queries happen here; everything
//! external was gathered into the [`DrawContext`] beforehand, so the same
//! inputs always yield the same choices.

use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;
use crate::functions::{BuiltinVariant, FetchScalarKind, TemplateParams};
use crate::settings::{
    Classification, CompositorFlags, CompositorSettings, Gradient, Illumination, JitterPosition,
    RaySetup, RayTraversal, Reconstruction, Shading, VolumeSettings,
};

/// The chosen variant for every stage, indexed by [`Stage::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantChoices {
    pub stages: [BuiltinVariant; Stage::COUNT],
    /// Clip Ray parameters, normalized to the chosen variant.
    pub clip_params: TemplateParams,
}

impl VariantChoices {
    #[inline]
    #[must_use]
    pub fn get(&self, stage: Stage) -> BuiltinVariant {
        self.stages[stage.index()]
    }
}

#[must_use]
pub fn choose_variants(
    settings: &CompositorSettings,
    volume: &VolumeSettings,
    ctx: &DrawContext,
) -> VariantChoices {
    // The context only carries a light if shading allows it.
    let lighting = volume.lighting && ctx.has_light();
    let (clip_ray, clip_params) = clip_ray(settings, ctx);

    VariantChoices {
        stages: [
            ray_setup(settings),
            clip_ray,
            jitter_position(settings),
            ray_traversal(settings, volume),
            clip_position(settings, ctx),
            reconstruction(settings, volume),
            fetch_scalar(ctx),
            shading(settings, volume, lighting),
            classification(settings, volume, ctx),
            gradient(settings, volume, lighting),
            gradient_input(settings, volume),
            illumination(settings, volume, lighting),
        ],
        clip_params,
    }
}

fn ray_setup(settings: &CompositorSettings) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_RAY_SETUP) {
        return BuiltinVariant::RaySetupNull;
    }
    match settings.ray_setup {
        RaySetup::Null => BuiltinVariant::RaySetupNull,
        RaySetup::ColorCube => BuiltinVariant::RaySetupColorCube,
        RaySetup::BoundingBoxIntersection => BuiltinVariant::RaySetupBoundingBoxIntersection,
        RaySetup::Hybrid => BuiltinVariant::RaySetupHybrid,
    }
}

fn clip_ray(settings: &CompositorSettings, ctx: &DrawContext) -> (BuiltinVariant, TemplateParams) {
    let variant = if settings.suppresses(CompositorFlags::NO_CLIP_RAY) {
        BuiltinVariant::ClipRayNull
    } else {
        match (ctx.num_clip_planes(), ctx.num_depth_textures()) {
            (0, 0) => BuiltinVariant::ClipRayNull,
            (1, 0) => BuiltinVariant::ClipRayPlane,
            (0, 1) => BuiltinVariant::ClipRayDepthTexture,
            _ => BuiltinVariant::ClipRayTemplate,
        }
    };

    let requested = TemplateParams::from_counts(ctx.num_clip_planes(), ctx.num_depth_textures());
    (variant, variant.parameterization().normalize(requested))
}

fn jitter_position(settings: &CompositorSettings) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_JITTER_POSITION) || !settings.dither_ray {
        return BuiltinVariant::JitterPositionNull;
    }
    match settings.jitter_position {
        JitterPosition::Null => BuiltinVariant::JitterPositionNull,
        JitterPosition::Stochastic => BuiltinVariant::JitterPositionStochastic,
        JitterPosition::Trigonometric => BuiltinVariant::JitterPositionTrigonometric,
    }
}

fn ray_traversal(settings: &CompositorSettings, volume: &VolumeSettings) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_RAY_TRAVERSAL) {
        return BuiltinVariant::RayTraversalNull;
    }
    match volume.ray_traversal {
        RayTraversal::Null => BuiltinVariant::RayTraversalNull,
        RayTraversal::DebugRayStart => BuiltinVariant::RayTraversalDebugRayStart,
        RayTraversal::DebugRayEnd => BuiltinVariant::RayTraversalDebugRayEnd,
        RayTraversal::DebugRayDirection => BuiltinVariant::RayTraversalDebugRayDirection,
        RayTraversal::DebugRayLength => BuiltinVariant::RayTraversalDebugRayLength,
        RayTraversal::Isosurface => BuiltinVariant::RayTraversalIsosurface,
        RayTraversal::Mip => BuiltinVariant::RayTraversalMip,
        RayTraversal::Gmip => BuiltinVariant::RayTraversalGmip,
        RayTraversal::DvrBackToFront => BuiltinVariant::RayTraversalDvrBackToFront,
        RayTraversal::DvrFrontToBack => BuiltinVariant::RayTraversalDvrFrontToBack,
        RayTraversal::Mida => BuiltinVariant::RayTraversalMida,
    }
}

/// Box wins over ellipsoid, ellipsoid over volume texture.
fn clip_position(settings: &CompositorSettings, ctx: &DrawContext) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_CLIP_POSITION) {
        BuiltinVariant::ClipPositionNull
    } else if !ctx.clip_boxes.is_empty() {
        BuiltinVariant::ClipPositionBox
    } else if !ctx.clip_ellipsoids.is_empty() {
        BuiltinVariant::ClipPositionEllipsoid
    } else if !ctx.clip_volume_textures.is_empty() {
        BuiltinVariant::ClipPositionVolumeTexture
    } else {
        BuiltinVariant::ClipPositionNull
    }
}

fn reconstruction(settings: &CompositorSettings, volume: &VolumeSettings) -> BuiltinVariant {
    // Suppression only downgrades to hardware filtering
    let reconstruction = if settings.suppresses(CompositorFlags::NO_RECONSTRUCTION)
        && volume.reconstruction.is_higher_order()
    {
        Reconstruction::Trilinear
    } else {
        volume.reconstruction
    };

    match reconstruction {
        Reconstruction::NearestNeighbour | Reconstruction::Trilinear => {
            BuiltinVariant::ReconstructionNull
        }
        Reconstruction::TriCubic => BuiltinVariant::ReconstructionTriCubic,
        Reconstruction::TriCubicKernel => BuiltinVariant::ReconstructionTriCubicKernel,
    }
}

fn fetch_scalar(ctx: &DrawContext) -> BuiltinVariant {
    let kind = ctx
        .scalar_texture
        .map_or(FetchScalarKind::Null, |texture| {
            FetchScalarKind::for_dimension(texture.dimension)
        });
    match kind {
        FetchScalarKind::Null => BuiltinVariant::FetchScalarNull,
        FetchScalarKind::Sampler2D => BuiltinVariant::FetchScalarSampler2D,
        FetchScalarKind::Sampler2DArray => BuiltinVariant::FetchScalarSampler2DArray,
        FetchScalarKind::Sampler3D => BuiltinVariant::FetchScalarSampler3D,
    }
}

fn shading(settings: &CompositorSettings, volume: &VolumeSettings, lighting: bool) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_SHADING) {
        return BuiltinVariant::ShadingNull;
    }
    match volume.shading {
        Shading::Null => BuiltinVariant::ShadingNull,
        Shading::DebugScalar => BuiltinVariant::ShadingDebugScalar,
        Shading::DebugPosition => BuiltinVariant::ShadingDebugPosition,
        Shading::DebugClassification => BuiltinVariant::ShadingDebugClassification,
        Shading::DebugGradient => BuiltinVariant::ShadingDebugGradient,
        Shading::DebugNormal => BuiltinVariant::ShadingDebugNormal,
        Shading::DebugViewingDirection => BuiltinVariant::ShadingDebugViewingDirection,
        Shading::DebugLightDirection => BuiltinVariant::ShadingDebugLightDirection,
        Shading::Lighting if !lighting => BuiltinVariant::ShadingNull,
        Shading::Lighting => {
            let accumulates = !settings.suppresses(CompositorFlags::NO_RAY_TRAVERSAL)
                && volume.ray_traversal.accumulates_opacity();
            if !settings.suppresses(CompositorFlags::NO_ILLUMINATION_THRESHOLD)
                && settings.illumination_threshold != 0.0
                && accumulates
            {
                BuiltinVariant::ShadingLightingThreshold
            } else {
                BuiltinVariant::ShadingLighting
            }
        }
    }
}

/// Transfer-function modes fall back to Null without their texture.
fn classification(
    settings: &CompositorSettings,
    volume: &VolumeSettings,
    ctx: &DrawContext,
) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_CLASSIFICATION) {
        return BuiltinVariant::ClassificationNull;
    }
    let has_transfer_function = ctx.transfer_function.is_some();
    match volume.classification {
        Classification::Null => BuiltinVariant::ClassificationNull,
        Classification::Threshold => BuiltinVariant::ClassificationThreshold,
        Classification::TransferFunction if has_transfer_function => {
            BuiltinVariant::ClassificationTransferFunction
        }
        Classification::TransferFunctionPreMultiplied if has_transfer_function => {
            BuiltinVariant::ClassificationTransferFunctionPreMultiplied
        }
        Classification::PreIntegration if has_transfer_function => {
            BuiltinVariant::ClassificationPreIntegration
        }
        Classification::TransferFunction
        | Classification::TransferFunctionPreMultiplied
        | Classification::PreIntegration => BuiltinVariant::ClassificationNull,
    }
}

fn gradient(settings: &CompositorSettings, volume: &VolumeSettings, lighting: bool) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_GRADIENT) || !lighting {
        return BuiltinVariant::GradientNull;
    }
    match volume.gradient {
        Gradient::Null => BuiltinVariant::GradientNull,
        Gradient::ForwardDifferences => BuiltinVariant::GradientForwardDifferences,
        Gradient::BackwardDifferences => BuiltinVariant::GradientBackwardDifferences,
        Gradient::CentralDifferences => BuiltinVariant::GradientCentralDifferences,
        Gradient::CentralDifferences9 => BuiltinVariant::GradientCentralDifferences9,
    }
}

fn gradient_input(settings: &CompositorSettings, volume: &VolumeSettings) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_GRADIENT_INPUT) {
        BuiltinVariant::GradientInputNull
    } else if volume.post_classification_gradient {
        BuiltinVariant::GradientInputClassified
    } else {
        BuiltinVariant::GradientInputScalar
    }
}

fn illumination(
    settings: &CompositorSettings,
    volume: &VolumeSettings,
    lighting: bool,
) -> BuiltinVariant {
    if settings.suppresses(CompositorFlags::NO_ILLUMINATION) || !lighting {
        return BuiltinVariant::IlluminationNull;
    }
    match volume.illumination {
        Illumination::Null => BuiltinVariant::IlluminationNull,
        Illumination::LambertianReflection => BuiltinVariant::IlluminationLambertianReflection,
        Illumination::BlinnPhong => BuiltinVariant::IlluminationBlinnPhong,
        Illumination::CookTorrance => BuiltinVariant::IlluminationCookTorrance,
    }
}
