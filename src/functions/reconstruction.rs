//! Reconstruction: higher-order filtering on top of the raw scalar fetch.
//!
//! Nearest and trilinear filtering are plain hardware fetches and use the
//! Null variant; the fetch stage picks the texture filter.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum ReconstructionKind {
        Null => "null",
        /// Cubic B-spline from eight linear fetches.
        TriCubic => "tri_cubic",
        TriCubicKernel => "tri_cubic_kernel",
    }
}

impl StageKind for ReconstructionKind {
    const STAGE: Stage = Stage::Reconstruction;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(ReconstructionFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructionFunction {
    kind: ReconstructionKind,
}

impl ReconstructionFunction {
    #[must_use]
    pub const fn new(kind: ReconstructionKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for ReconstructionFunction {
    fn stage(&self) -> Stage {
        Stage::Reconstruction
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind != ReconstructionKind::Null {
            program.set_vec3("VolumeTextureSize", ctx.voxel_spacing.recip());
        }
    }
}
