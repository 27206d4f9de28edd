//! Clip Ray: shortens the ray against clip planes and the depth buffer.
//!
//! The only templated stage. `Template` is instantiated once per distinct
//! (clip plane count, depth texture count) pair; the three fixed variants
//! cover the common cases without a loop in the shader.

use super::{Parameterization, ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::{ProgramParameters, TextureFilter};
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum ClipRayKind {
        Null => "null",
        /// Exactly one clip plane, no depth texture.
        Plane => "plane",
        /// Depth texture only.
        DepthTexture => "depth_texture",
        /// Any number of planes and depth textures.
        Template => "template",
    }
}

impl StageKind for ClipRayKind {
    const STAGE: Stage = Stage::ClipRay;

    fn instantiate(self, params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(ClipRayFunction::new(
            self,
            self.parameterization().normalize(params),
        ))
    }

    fn parameterization(self) -> Parameterization {
        match self {
            ClipRayKind::Null => Parameterization::Fixed(TemplateParams::new(0, 0)),
            ClipRayKind::Plane => Parameterization::Fixed(TemplateParams::new(1, 0)),
            ClipRayKind::DepthTexture => Parameterization::Fixed(TemplateParams::new(0, 1)),
            ClipRayKind::Template => Parameterization::Templated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRayFunction {
    kind: ClipRayKind,
    params: TemplateParams,
}

impl ClipRayFunction {
    #[must_use]
    pub const fn new(kind: ClipRayKind, params: TemplateParams) -> Self {
        Self { kind, params }
    }

    fn bind_depth_texture(program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if let Some(texture) = ctx.depth_texture {
            program.set_texture("DepthTexture", texture, TextureFilter::Nearest);
            program.set_mat4("ClipSpaceToObjectSpace", ctx.clip_to_object);
        }
    }
}

impl ShaderFunction for ClipRayFunction {
    fn stage(&self) -> Stage {
        Stage::ClipRay
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn template_params(&self) -> TemplateParams {
        self.params
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        match self.kind {
            ClipRayKind::Null => {}
            ClipRayKind::Plane => {
                if let Some(plane) = ctx.clip_planes.first() {
                    program.set_vec4("ClipPlane", plane.plane);
                    program.set_int("InvertClipPlane", i32::from(plane.inverted));
                }
            }
            ClipRayKind::DepthTexture => Self::bind_depth_texture(program, ctx),
            ClipRayKind::Template => {
                let count = usize::from(self.params.num_clip_planes);
                for (i, plane) in ctx.clip_planes.iter().take(count).enumerate() {
                    program.set_vec4(&format!("ClipPlanes[{i}]"), plane.plane);
                    program.set_int(&format!("InvertClipPlanes[{i}]"), i32::from(plane.inverted));
                }
                if self.params.num_depth_textures > 0 {
                    Self::bind_depth_texture(program, ctx);
                }
            }
        }
    }
}
