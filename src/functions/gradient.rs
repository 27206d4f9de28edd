//! Gradient: finite-difference estimation of the scalar field gradient.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum GradientKind {
        /// Constant up vector.
        Null => "null",
        ForwardDifferences => "forward_differences",
        BackwardDifferences => "backward_differences",
        CentralDifferences => "central_differences",
        /// Central differences averaged with the eight neighbour gradients.
        CentralDifferences9 => "central_differences_9",
    }
}

impl StageKind for GradientKind {
    const STAGE: Stage = Stage::Gradient;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(GradientFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientFunction {
    kind: GradientKind,
}

impl GradientFunction {
    #[must_use]
    pub const fn new(kind: GradientKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for GradientFunction {
    fn stage(&self) -> Stage {
        Stage::Gradient
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind != GradientKind::Null {
            program.set_vec3("VolumeTextureSpacing", ctx.voxel_spacing);
        }
    }
}
