//! Ray Setup: computes ray entry, direction and travel length.
//!
//! Ray setup owns the program entry points, so every variant, including
//! Null, emits the vertex and fragment `main`.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::{ProgramParameters, TextureFilter};
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum RaySetupKind {
        Null => "null",
        /// Front faces of a color cube rendered in an offscreen pass.
        ColorCube => "color_cube",
        BoundingBoxIntersection => "bounding_box_intersection",
        Hybrid => "hybrid",
    }
}

impl RaySetupKind {
    /// Whether the variant samples the color cube front texture.
    #[must_use]
    pub fn uses_front_texture(self) -> bool {
        matches!(self, RaySetupKind::ColorCube | RaySetupKind::Hybrid)
    }
}

impl StageKind for RaySetupKind {
    const STAGE: Stage = Stage::RaySetup;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(RaySetupFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaySetupFunction {
    kind: RaySetupKind,
}

impl RaySetupFunction {
    #[must_use]
    pub const fn new(kind: RaySetupKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for RaySetupFunction {
    fn stage(&self) -> Stage {
        Stage::RaySetup
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        program.set_mat4("ObjectSpaceToClipSpaceMatrix", ctx.object_to_clip);
        program.set_float("StepSize", ctx.step_size);
        program.set_vec3("CameraPosition", ctx.camera_position);

        if self.kind.uses_front_texture()
            && let Some(texture) = ctx.front_texture
        {
            program.set_texture("FrontTexture", texture, TextureFilter::Nearest);
        }
    }
}
