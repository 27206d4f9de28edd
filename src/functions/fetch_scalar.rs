//! Fetch Scalar: one raw fetch from the scalar-field texture, one variant
//! per texture dimensionality.

use super::{ShaderFunction, StageKind, TemplateParams, stage_kind};
use crate::backend::ProgramParameters;
use crate::compositor::context::DrawContext;
use crate::compositor::stage::Stage;
use crate::scene::TextureDimension;

stage_kind! {
    pub enum FetchScalarKind {
        Null => "null",
        Sampler2D => "sampler_2d",
        Sampler2DArray => "sampler_2d_array",
        Sampler3D => "sampler_3d",
    }
}

impl FetchScalarKind {
    /// The fetch variant able to sample a texture of `dimension`.
    #[must_use]
    pub fn for_dimension(dimension: TextureDimension) -> Self {
        match dimension {
            TextureDimension::D2 => FetchScalarKind::Sampler2D,
            TextureDimension::D2Array => FetchScalarKind::Sampler2DArray,
            TextureDimension::D3 => FetchScalarKind::Sampler3D,
            TextureDimension::D1 | TextureDimension::Cube => FetchScalarKind::Null,
        }
    }
}

impl StageKind for FetchScalarKind {
    const STAGE: Stage = Stage::FetchScalar;

    fn instantiate(self, _params: TemplateParams) -> Box<dyn ShaderFunction> {
        Box::new(FetchScalarFunction::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchScalarFunction {
    kind: FetchScalarKind,
}

impl FetchScalarFunction {
    #[must_use]
    pub const fn new(kind: FetchScalarKind) -> Self {
        Self { kind }
    }
}

impl ShaderFunction for FetchScalarFunction {
    fn stage(&self) -> Stage {
        Stage::FetchScalar
    }

    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn set_program(&self, program: &mut dyn ProgramParameters, ctx: &DrawContext) {
        if self.kind == FetchScalarKind::Null {
            return;
        }
        if let Some(texture) = ctx.scalar_texture {
            program.set_texture("VolumeTexture", texture.handle, ctx.texture_filter);
        }
    }
}
