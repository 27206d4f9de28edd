//! Per-draw context gathering.
//!
//! [`DrawContext::gather`] runs once per draw call, before selection. It
//! issues the scene and resource queries the current flags allow, converts
//! every world-space primitive into volume object space and derives the
//! scalars the shader functions bind later. The same context feeds the
//! selection policy and the per-draw parameter binding, so both always see
//! identical data.

use glam::{Mat4, UVec3, Vec3, Vec4};
use smallvec::SmallVec;

use crate::backend::{TextureFilter, TextureHandle};
use crate::scene::{
    DrawTransforms, PrimitiveKind, ScalarTexture, ScenePrimitive, SceneQuery, VolumeResources,
};
use crate::settings::{
    CompositorFlags, CompositorSettings, RaySetup, Reconstruction, Shading, VolumeSettings,
};

/// Sample count used when the scalar field is not available.
const FALLBACK_SAMPLES_PER_RAY: f32 = 256.0;

/// A clip plane in volume object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub plane: Vec4,
    pub inverted: bool,
}

/// A clip box or ellipsoid in volume object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVolume {
    pub object_to_local: Mat4,
    pub inverted: bool,
}

/// A clip mask texture in volume object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipMask {
    pub object_to_local: Mat4,
    pub texture: TextureHandle,
    pub inverted: bool,
}

/// The directional light used for illumination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Normalized object-space direction pointing towards the light.
    pub direction: Vec3,
    pub color: Vec3,
}

/// Everything the selection policy and the per-draw binding need to know
/// about one volume draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawContext {
    pub clip_planes: SmallVec<[ClipPlane; 4]>,
    pub clip_boxes: SmallVec<[ClipVolume; 2]>,
    pub clip_ellipsoids: SmallVec<[ClipVolume; 2]>,
    pub clip_volume_textures: SmallVec<[ClipMask; 2]>,
    pub depth_texture: Option<TextureHandle>,
    /// Front-face positions of the color cube pass.
    pub front_texture: Option<TextureHandle>,
    /// First visible directional light, `None` if lighting is impossible and
    /// the light direction is not being visualized.
    pub light: Option<Light>,
    pub scalar_texture: Option<ScalarTexture>,
    /// Transfer-function texture of the requested classification flavor.
    pub transfer_function: Option<TextureHandle>,

    pub object_to_clip: Mat4,
    pub clip_to_object: Mat4,
    /// Camera position in volume object space.
    pub camera_position: Vec3,
    /// Object-space distance between two samples along a ray.
    pub step_size: f32,
    /// Object-space size of one voxel at the active texture LOD.
    pub voxel_spacing: Vec3,
    pub texture_filter: TextureFilter,

    pub threshold: f32,
    pub isosurface_value: f32,
    pub illumination_threshold: f32,
    pub dither_strength: f32,
}

impl Default for DrawContext {
    fn default() -> Self {
        Self {
            clip_planes: SmallVec::new(),
            clip_boxes: SmallVec::new(),
            clip_ellipsoids: SmallVec::new(),
            clip_volume_textures: SmallVec::new(),
            depth_texture: None,
            front_texture: None,
            light: None,
            scalar_texture: None,
            transfer_function: None,
            object_to_clip: Mat4::IDENTITY,
            clip_to_object: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            step_size: 1.0 / FALLBACK_SAMPLES_PER_RAY,
            voxel_spacing: Vec3::splat(1.0 / FALLBACK_SAMPLES_PER_RAY),
            texture_filter: TextureFilter::Linear,
            threshold: 0.0,
            isosurface_value: 0.0,
            illumination_threshold: 0.0,
            dither_strength: 0.0,
        }
    }
}

impl DrawContext {
    /// Collects the per-draw state. Queries for suppressed stages are never
    /// issued.
    pub fn gather(
        settings: &CompositorSettings,
        volume: &VolumeSettings,
        scene: &dyn SceneQuery,
        resources: &dyn VolumeResources,
        transforms: &DrawTransforms,
    ) -> Self {
        let object_to_world = transforms.object_to_world;
        let world_to_object = object_to_world.inverse();
        let object_to_clip = transforms.world_to_clip * object_to_world;

        let mut ctx = Self {
            object_to_clip,
            clip_to_object: object_to_clip.inverse(),
            camera_position: world_to_object.transform_point3(transforms.camera_position),
            threshold: volume.threshold,
            isosurface_value: volume.isosurface_value,
            illumination_threshold: settings.illumination_threshold,
            dither_strength: if settings.dither_ray { 1.0 } else { 0.0 },
            texture_filter: texture_filter(volume.reconstruction),
            ..Self::default()
        };

        if !settings.suppresses(CompositorFlags::NO_RAY_SETUP)
            && matches!(settings.ray_setup, RaySetup::ColorCube | RaySetup::Hybrid)
        {
            ctx.front_texture = scene.front_texture();
        }

        if !settings.suppresses(CompositorFlags::NO_CLIP_RAY) {
            for primitive in scene.intersecting(PrimitiveKind::ClipPlane) {
                if let ScenePrimitive::ClipPlane { plane, inverted } = primitive {
                    // Planes transform with the inverse transpose of the point transform.
                    ctx.clip_planes.push(ClipPlane {
                        plane: object_to_world.transpose() * plane,
                        inverted,
                    });
                }
            }

            if !settings.suppresses(CompositorFlags::NO_DEPTH_TEXTURE) {
                ctx.depth_texture = scene.depth_texture();
            }
        }

        if !settings.suppresses(CompositorFlags::NO_CLIP_POSITION) {
            for primitive in scene.intersecting(PrimitiveKind::ClipBox) {
                if let ScenePrimitive::ClipBox {
                    world_to_local,
                    inverted,
                } = primitive
                {
                    ctx.clip_boxes.push(ClipVolume {
                        object_to_local: world_to_local * object_to_world,
                        inverted,
                    });
                }
            }
            for primitive in scene.intersecting(PrimitiveKind::ClipEllipsoid) {
                if let ScenePrimitive::ClipEllipsoid {
                    world_to_local,
                    inverted,
                } = primitive
                {
                    ctx.clip_ellipsoids.push(ClipVolume {
                        object_to_local: world_to_local * object_to_world,
                        inverted,
                    });
                }
            }
            for primitive in scene.intersecting(PrimitiveKind::ClipVolumeTexture) {
                if let ScenePrimitive::ClipVolumeTexture {
                    world_to_local,
                    texture,
                    inverted,
                } = primitive
                {
                    ctx.clip_volume_textures.push(ClipMask {
                        object_to_local: world_to_local * object_to_world,
                        texture,
                        inverted,
                    });
                }
            }
        }

        // Lighting needs shading, the object's consent and a light, in that order.
        // The light direction debug mode visualizes the light even when unlit.
        if !settings.suppresses(CompositorFlags::NO_SHADING)
            && (volume.lighting || volume.shading == Shading::DebugLightDirection)
        {
            ctx.light = scene
                .intersecting(PrimitiveKind::DirectionalLight)
                .into_iter()
                .find_map(|primitive| match primitive {
                    ScenePrimitive::DirectionalLight { direction, color } => Some(Light {
                        direction: -world_to_object.transform_vector3(direction).normalize_or_zero(),
                        color,
                    }),
                    _ => None,
                });
        }

        if !settings.suppresses(CompositorFlags::NO_FETCH_SCALAR) {
            ctx.scalar_texture = resources.scalar_texture();
        }

        if !settings.suppresses(CompositorFlags::NO_CLASSIFICATION)
            && let Some(flavor) = volume.classification.transfer_function_flavor()
        {
            ctx.transfer_function = resources.transfer_function(flavor);
        }

        if let Some(texture) = ctx.scalar_texture {
            let lod = volume
                .volume_texture_lod
                .saturating_add(settings.global_volume_texture_lod);
            let size = size_at_lod(texture.size, lod);
            let samples = size.max_element() as f32
                * volume.sample_rate_factor
                * settings.global_sample_rate_factor;
            if samples > 0.0 {
                ctx.step_size = 1.0 / samples;
            }
            ctx.voxel_spacing = Vec3::ONE / size.as_vec3();
        }

        ctx
    }

    #[must_use]
    pub fn num_clip_planes(&self) -> usize {
        self.clip_planes.len()
    }

    #[must_use]
    pub fn num_depth_textures(&self) -> usize {
        usize::from(self.depth_texture.is_some())
    }

    #[must_use]
    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }
}

/// Voxel dimensions at mip level `lod`, never below one voxel.
fn size_at_lod(size: UVec3, lod: u32) -> UVec3 {
    let shift = lod.min(31);
    (size >> shift).max(UVec3::ONE)
}

/// Hardware filter the scalar fetch needs. Cubic filters are built from
/// linear fetches.
fn texture_filter(reconstruction: Reconstruction) -> TextureFilter {
    match reconstruction {
        Reconstruction::NearestNeighbour => TextureFilter::Nearest,
        Reconstruction::Trilinear | Reconstruction::TriCubic | Reconstruction::TriCubicKernel => {
            TextureFilter::Linear
        }
    }
}
