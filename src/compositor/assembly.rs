//! Source Assembly
//!
//! Builds the vertex and fragment program text of one composition:
//!
//! ```text
//! preamble                          (both programs)
//! signatures                        (fragment program)
//! header slot of every function     first pass, emission order
//! body slot of every function       second pass, emission order
//! ```
//!
//! Emission order is the reverse of execution order, so a stage's callees
//! are defined before it; the signature catalogue makes the fragment program
//! independent of that order anyway.

use super::cache::{FunctionCache, FunctionKey};
use super::stage::{SourceSlot, Stage};
use crate::errors::{CompositorError, Result};
use crate::functions::templates;

/// Assembled, not yet compiled program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSources {
    pub vertex: String,
    pub fragment: String,
}

/// Backend profile names for `language`, e.g. `glslv` / `glslf`.
#[must_use]
pub fn profiles(language: &str) -> (String, String) {
    let language = language.to_ascii_lowercase();
    (format!("{language}v"), format!("{language}f"))
}

/// Assembles both programs from the instances in `functions`, which are
/// indexed by [`Stage::index`].
pub fn assemble(
    cache: &FunctionCache,
    functions: &[FunctionKey; Stage::COUNT],
    language: &str,
) -> Result<AssembledSources> {
    let preamble = templates::render_preamble(language)?;
    let mut vertex = preamble.clone();
    let mut fragment = preamble;
    fragment.push_str(&templates::render_signatures(language)?);

    let passes = [
        (SourceSlot::VertexHeader, SourceSlot::FragmentHeader),
        (SourceSlot::VertexBody, SourceSlot::FragmentBody),
    ];
    for (vertex_slot, fragment_slot) in passes {
        for stage in Stage::EMISSION_ORDER {
            let function = cache
                .get(functions[stage.index()])
                .ok_or_else(|| CompositorError::UnknownVariant(stage.to_string()))?;
            vertex.push_str(&function.source_code(language, vertex_slot)?);
            fragment.push_str(&function.source_code(language, fragment_slot)?);
        }
    }

    Ok(AssembledSources { vertex, fragment })
}
