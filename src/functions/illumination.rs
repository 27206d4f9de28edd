//! Illumination: local lighting models.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum IlluminationKind {
        /// Surface color unchanged.
        Null => "null",
        LambertianReflection => "lambertian_reflection",
        BlinnPhong => "blinn_phong",
        CookTorrance => "cook_torrance",
    }
}

impl StageKind for IlluminationKind {
    const STAGE: Stage = Stage::Illumination;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(IlluminationFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IlluminationFunction {
    kind: IlluminationKind,
}

impl IlluminationFunction {
    #[must_use]
    pub const fn new(kind: IlluminationKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for IlluminationFunction {
    fn stage(&self) -> Stage {
        Stage::Illumination
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind == IlluminationKind::Null {
            return;
        }
        if let Some(light) = ctx.light {
            program.set_vec3("LightDirection", light.direction);
            program.set_vec3("LightColor", light.color);
        }
    }
}
