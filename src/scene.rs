//! Scene & Resource Interfaces
//!
//! Read-only views of the outside world the selection policy consumes:
//!
//! - [`SceneQuery`]: visibility results for the volume being drawn
//! - [`VolumeResources`]: the volume's scalar-field and transfer-function textures
//! - [`DrawTransforms`]: per-draw matrices supplied by the render pass
//!
//! All primitives are reported in world space; the compositor converts them
//! into volume object space when it gathers the draw context.

use glam::{Mat4, UVec3, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::backend::TextureHandle;

/// Primitive-type filter for [`SceneQuery::intersecting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    ClipPlane,
    ClipBox,
    ClipEllipsoid,
    ClipVolumeTexture,
    DirectionalLight,
}

/// A visible scene instance intersecting the volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePrimitive {
    /// World-space plane equation `(a, b, c, d)`; points with a positive
    /// distance are kept unless `inverted`.
    ClipPlane { plane: Vec4, inverted: bool },
    /// Unit box `[-0.5, 0.5]^3` in the primitive's local space.
    ClipBox { world_to_local: Mat4, inverted: bool },
    /// Unit sphere in the primitive's local space.
    ClipEllipsoid { world_to_local: Mat4, inverted: bool },
    /// Mask texture covering `[0, 1]^3` in the primitive's local space.
    ClipVolumeTexture {
        world_to_local: Mat4,
        texture: TextureHandle,
        inverted: bool,
    },
    /// World-space direction the light travels in.
    DirectionalLight { direction: Vec3, color: Vec3 },
}

impl ScenePrimitive {
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            ScenePrimitive::ClipPlane { .. } => PrimitiveKind::ClipPlane,
            ScenePrimitive::ClipBox { .. } => PrimitiveKind::ClipBox,
            ScenePrimitive::ClipEllipsoid { .. } => PrimitiveKind::ClipEllipsoid,
            ScenePrimitive::ClipVolumeTexture { .. } => PrimitiveKind::ClipVolumeTexture,
            ScenePrimitive::DirectionalLight { .. } => PrimitiveKind::DirectionalLight,
        }
    }
}

/// Scene / visibility collaborator for one volume draw call.
pub trait SceneQuery {
    /// Returns the visible instances of `kind` intersecting the volume.
    fn intersecting(&self, kind: PrimitiveKind) -> Vec<ScenePrimitive>;

    /// The scene depth buffer texture, if the frame produced one.
    fn depth_texture(&self) -> Option<TextureHandle>;

    /// Front-face positions of the color cube pass, if the renderer ran it.
    fn front_texture(&self) -> Option<TextureHandle> {
        None
    }
}

/// Dimensionality of the texture backing a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureDimension {
    D1,
    D2,
    D2Array,
    D3,
    Cube,
}

/// The uploaded scalar-field texture of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarTexture {
    pub handle: TextureHandle,
    pub dimension: TextureDimension,
    /// Size in voxels at LOD 0.
    pub size: UVec3,
}

/// Flavor of a transfer-function lookup texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferFunctionFlavor {
    Standard,
    PreMultiplied,
    PreIntegrated,
}

/// Resource introspection collaborator for one volume.
pub trait VolumeResources {
    /// The scalar-field texture, `None` while not uploaded.
    fn scalar_texture(&self) -> Option<ScalarTexture>;

    /// The transfer-function texture of `flavor`, `None` while not uploaded.
    fn transfer_function(&self, flavor: TransferFunctionFlavor) -> Option<TextureHandle>;
}

/// Per-draw matrices supplied by the rendering pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    pub object_to_world: Mat4,
    pub world_to_clip: Mat4,
    /// Camera position in world space.
    pub camera_position: Vec3,
}

impl Default for DrawTransforms {
    fn default() -> Self {
        Self {
            object_to_world: Mat4::IDENTITY,
            world_to_clip: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
        }
    }
}
