//! Shader Composition
//!
//! A linked program paired with the function instances that produced it.
//! Immutable once registered: the only runtime operation is activating the
//! program and letting every function push its per-draw parameters.

use std::fmt::Write as _;

use super::cache::{FunctionCache, FunctionKey};
use super::context::DrawContext;
use super::identity::CompositionId;
use super::registry::FunctionRegistry;
use super::stage::Stage;
use crate::backend::{ProgramParameters, ShaderBackend};

#[derive(Debug)]
pub struct ShaderComposition<P> {
    id: CompositionId,
    program: P,
    /// Function instances in execution order, indexed by [`Stage::index`].
    functions: [FunctionKey; Stage::COUNT],
    vertex_source: String,
    fragment_source: String,
}

impl<P> ShaderComposition<P> {
    pub(crate) fn new(
        id: CompositionId,
        program: P,
        functions: [FunctionKey; Stage::COUNT],
        vertex_source: String,
        fragment_source: String,
    ) -> Self {
        Self {
            id,
            program,
            functions,
            vertex_source,
            fragment_source,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &CompositionId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn program(&self) -> &P {
        &self.program
    }

    #[inline]
    #[must_use]
    pub fn function(&self, stage: Stage) -> FunctionKey {
        self.functions[stage.index()]
    }

    #[inline]
    #[must_use]
    pub fn functions(&self) -> &[FunctionKey; Stage::COUNT] {
        &self.functions
    }

    #[must_use]
    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    #[must_use]
    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// Makes the program current. Safe to call when it already is.
    pub fn activate<B>(&self, backend: &mut B) -> bool
    where
        B: ShaderBackend<Program = P>,
    {
        backend.set_active_program(&self.program)
    }

    /// Diagnostic dump: identity followed by both sources.
    #[must_use]
    pub fn dump(&self, registry: &FunctionRegistry) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}", self.id.display(registry));
        let _ = writeln!(out, "--- vertex ---");
        out.push_str(&self.vertex_source);
        let _ = writeln!(out, "--- fragment ---");
        out.push_str(&self.fragment_source);
        out
    }
}

impl<P: ProgramParameters> ShaderComposition<P> {
    /// Lets every function, in execution order, push its per-draw parameters
    /// into the program. Call after [`activate`](Self::activate).
    pub fn bind(&mut self, functions: &FunctionCache, ctx: &DrawContext) {
        for key in self.functions {
            if let Some(function) = functions.get(key) {
                function.set_program(&mut self.program, ctx);
            }
        }
    }
}
