//! Gradient Input: raw or classified scalars as input of the gradient.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum GradientInputKind {
        Null => "null",
        Scalar => "scalar",
        /// Post-classification gradients, computed on opacity.
        Classified => "classified",
    }
}

impl StageKind for GradientInputKind {
    const STAGE: Stage = Stage::GradientInput;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(GradientInputFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientInputFunction {
    kind: GradientInputKind,
}

impl GradientInputFunction {
    #[must_use]
    pub const fn new(kind: GradientInputKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for GradientInputFunction {
    fn stage(&self) -> Stage {
        Stage::GradientInput
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }
}
