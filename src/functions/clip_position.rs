//! Clip Position: per-sample clipping against boxes, ellipsoids and mask
//! textures. Only the first primitive of the selected kind is bound.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::{ProgramParameters, TextureFilter};
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum ClipPositionKind {
        Null => "null",
        Box => "box",
        Ellipsoid => "ellipsoid",
        VolumeTexture => "volume_texture",
    }
}

impl StageKind for ClipPositionKind {
    const STAGE: Stage = Stage::ClipPosition;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(ClipPositionFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPositionFunction {
    kind: ClipPositionKind,
}

impl ClipPositionFunction {
    #[must_use]
    pub const fn new(kind: ClipPositionKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for ClipPositionFunction {
    fn stage(&self) -> Stage {
        Stage::ClipPosition
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        match self.kind {
            ClipPositionKind::Null => {}
            ClipPositionKind::Box => {
                if let Some(clip_box) = ctx.clip_boxes.first() {
                    program.set_mat4("ClipBoxMatrix", clip_box.object_to_local);
                    program.set_int("InvertClipBox", i32::from(clip_box.inverted));
                }
            }
            ClipPositionKind::Ellipsoid => {
                if let Some(ellipsoid) = ctx.clip_ellipsoids.first() {
                    program.set_mat4("ClipEllipsoidMatrix", ellipsoid.object_to_local);
                    program.set_int("InvertClipEllipsoid", i32::from(ellipsoid.inverted));
                }
            }
            ClipPositionKind::VolumeTexture => {
                if let Some(mask) = ctx.clip_volume_textures.first() {
                    program.set_texture("ClipVolumeTexture", mask.texture, TextureFilter::Linear);
                    program.set_mat4("ClipVolumeTextureMatrix", mask.object_to_local);
                    program.set_int("InvertClipVolumeTexture", i32::from(mask.inverted));
                }
            }
        }
    }
}
