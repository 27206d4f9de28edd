//! Shading: turns a scalar and its position into an RGBA contribution.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;

stage_kind! {
    pub enum ShadingKind {
        /// Returns the classification result unshaded.
        Null => "null",
        DebugScalar => "debug_scalar",
        DebugPosition => "debug_position",
        DebugClassification => "debug_classification",
        DebugGradient => "debug_gradient",
        DebugNormal => "debug_normal",
        DebugViewingDirection => "debug_viewing_direction",
        DebugLightDirection => "debug_light_direction",
        Lighting => "lighting",
        /// Lighting skipped for samples below the illumination threshold.
        LightingThreshold => "lighting_threshold",
    }
}

impl ShadingKind {
    #[must_use]
    pub fn uses_light_direction(self) -> bool {
        matches!(
            self,
            ShadingKind::Lighting | ShadingKind::LightingThreshold | ShadingKind::DebugLightDirection
        )
    }
}

impl StageKind for ShadingKind {
    const STAGE: Stage = Stage::Shading;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(ShadingFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingFunction {
    kind: ShadingKind,
}

impl ShadingFunction {
    #[must_use]
    pub const fn new(kind: ShadingKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for ShadingFunction {
    fn stage(&self) -> Stage {
        Stage::Shading
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind.uses_light_direction()
            && let Some(light) = ctx.light
        {
            program.set_vec3("LightDirection", light.direction);
        }
        if self.kind == ShadingKind::LightingThreshold {
            program.set_float("IlluminationThreshold", ctx.illumination_threshold);
        }
    }
}
