#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Volume shader composition.
//!
//! Selects one interchangeable shader function per ray-casting stage for
//! every volume draw call, assembles them into a vertex/fragment program and
//! caches the compiled result so each feature combination is compiled once.
//!
//! - [`compositor`]: selection policy, identities, caches, source assembly
//! - [`functions`]: the shader function contract and the built-in variants
//! - [`backend`] / [`scene`]: collaborator interfaces the host implements
//! - [`settings`]: renderer-side and per-volume configuration

pub mod backend;
pub mod compositor;
pub mod errors;
pub mod functions;
pub mod scene;
pub mod settings;
pub mod utils;

pub use backend::{ProgramParameters, ShaderBackend, TextureFilter, TextureHandle};
pub use compositor::{
    CacheStats, CompositionId, CompositionKey, Compositor, DrawContext, DrawRequest,
    FunctionRegistry, Selection, ShaderComposition, SourceSlot, Stage,
};
pub use errors::{CompositorError, Result};
pub use functions::{BuiltinVariant, Parameterization, ShaderFunction, TemplateParams};
pub use scene::{
    DrawTransforms, PrimitiveKind, ScalarTexture, ScenePrimitive, SceneQuery, TextureDimension,
    TransferFunctionFlavor, VolumeResources,
};
pub use settings::{CompositorFlags, CompositorSettings, VolumeSettings};
pub use utils::interner;
