//! Jitter Position: offsets the ray start to hide sampling artifacts.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum JitterPositionKind {
        Null => "null",
        Stochastic => "stochastic",
        Trigonometric => "trigonometric",
    }
}

impl StageKind for JitterPositionKind {
    const STAGE: Stage = Stage::JitterPosition;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(JitterPositionFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterPositionFunction {
    kind: JitterPositionKind,
}

impl JitterPositionFunction {
    #[must_use]
    pub const fn new(kind: JitterPositionKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for JitterPositionFunction {
    fn stage(&self) -> Stage {
        Stage::JitterPosition
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind != JitterPositionKind::Null {
            program.set_float("DitherRay", ctx.dither_strength);
        }
    }
}
