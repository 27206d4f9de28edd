//! Classification: maps a scalar to RGBA.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::{ProgramParameters, TextureFilter};
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum ClassificationKind {
        /// The scalar as gray value.
        Null => "null",
        Threshold => "threshold",
        TransferFunction => "transfer_function",
        TransferFunctionPreMultiplied => "transfer_function_pre_multiplied",
        PreIntegration => "pre_integration",
    }
}

impl StageKind for ClassificationKind {
    const STAGE: Stage = Stage::Classification;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(ClassificationFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationFunction {
    kind: ClassificationKind,
}

impl ClassificationFunction {
    #[must_use]
    pub const fn new(kind: ClassificationKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for ClassificationFunction {
    fn stage(&self) -> Stage {
        Stage::Classification
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        match self.kind {
            ClassificationKind::Null => {}
            ClassificationKind::Threshold => {
                program.set_float("Threshold", ctx.threshold);
            }
            ClassificationKind::TransferFunction
            | ClassificationKind::TransferFunctionPreMultiplied
            | ClassificationKind::PreIntegration => {
                if let Some(texture) = ctx.transfer_function {
                    program.set_texture("TransferFunction", texture, TextureFilter::Linear);
                }
            }
        }
    }
}
