//! Ray Traversal: the sampling loop and its compositing scheme.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum RayTraversalKind {
        Null => "null",
        DebugRayStart => "debug_ray_start",
        DebugRayEnd => "debug_ray_end",
        DebugRayDirection => "debug_ray_direction",
        DebugRayLength => "debug_ray_length",
        Isosurface => "isosurface",
        Mip => "mip",
        Gmip => "gmip",
        DvrBackToFront => "dvr_back_to_front",
        DvrFrontToBack => "dvr_front_to_back",
        Mida => "mida",
    }
}

impl StageKind for RayTraversalKind {
    const STAGE: Stage = Stage::RayTraversal;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(RayTraversalFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayTraversalFunction {
    kind: RayTraversalKind,
}

impl RayTraversalFunction {
    #[must_use]
    pub const fn new(kind: RayTraversalKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for RayTraversalFunction {
    fn stage(&self) -> Stage {
        Stage::RayTraversal
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind == RayTraversalKind::Isosurface {
            program.set_float("IsosurfaceValue", ctx.isosurface_value);
        }
    }
}
