//! Error Types
//!
//! This module defines the error types used throughout the compositor.
//!
//! # Overview
//!
//! The main error type [`CompositorError`] covers every way a composition
//! request can fail:
//! - Shader language resolution failures
//! - Invalid composition identities (unresolved stage variants)
//! - Backend compile and link failures
//! - Template rendering and configuration parsing errors
//!
//! All of them are local to a single draw call. The caller is expected to
//! skip drawing for that call; nothing is retried and nothing is cached.
//!
//! # Usage
//!
//! ```rust,ignore
//! use volume_compositor::errors::Result;
//!
//! fn compose() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::compositor::stage::Stage;

/// The main error type for the compositor.
#[derive(Error, Debug)]
pub enum CompositorError {
    // ========================================================================
    // Selection Errors
    // ========================================================================
    /// The requested shader language is not provided by the backend.
    #[error("Shader language not available: {0}")]
    UnknownShaderLanguage(String),

    /// No language was requested and the backend has no default one.
    #[error("Backend reports no default shader language")]
    NoDefaultShaderLanguage,

    /// One or more stages could not be resolved to a registered variant.
    #[error("Invalid composition identity, unresolved stages: {stages:?}")]
    InvalidComposition {
        /// The stages whose variant is missing or mismatched
        stages: Vec<Stage>,
    },

    /// A variant id does not belong to the registry in use.
    #[error("Unknown shader function variant: {0}")]
    UnknownVariant(String),

    /// The registry has no id left for a new variant name.
    #[error("Function registry is full ({0} variants)")]
    RegistryFull(usize),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The backend rejected the assembled vertex shader.
    #[error("Vertex shader compilation failed ({language})")]
    VertexShaderCompilation {
        /// Shader language the source was written in
        language: String,
    },

    /// The backend rejected the assembled fragment shader.
    #[error("Fragment shader compilation failed ({language})")]
    FragmentShaderCompilation {
        /// Shader language the source was written in
        language: String,
    },

    /// The backend failed to link the compiled shaders.
    #[error("Program link failed ({language})")]
    ProgramLink {
        /// Shader language the program was linked for
        language: String,
    },

    /// The backend refused to make a linked program current.
    #[error("Program activation failed (composition {checksum:#010x})")]
    Activation {
        /// Checksum of the composition identity
        checksum: u32,
    },

    // ========================================================================
    // Template & Configuration Errors
    // ========================================================================
    /// A shader template failed to load or render.
    #[error("Shader template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Settings could not be parsed.
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Alias for `Result<T, CompositorError>`.
pub type Result<T> = std::result::Result<T, CompositorError>;
