//! Shader Backend Interface
//!
//! The compositor never talks to a graphics API directly. It hands assembled
//! source text to a [`ShaderBackend`] and receives an opaque linked program
//! back. Every backend operation signals failure with `None`; the compositor
//! treats that as a hard failure for the current draw call.

use glam::{Mat4, Vec3, Vec4};

/// Opaque handle of a texture owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Texture filtering requested when binding a texture to a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Unfiltered fetch of the nearest texel.
    Nearest,
    /// Hardware (bi/tri)linear filtering.
    #[default]
    Linear,
}

/// Named parameters of a linked GPU program.
///
/// Setters return whether the program actually declares the parameter; a
/// variant that does not use a parameter simply has it optimized away.
pub trait ProgramParameters {
    fn set_float(&mut self, name: &str, value: f32) -> bool;

    fn set_int(&mut self, name: &str, value: i32) -> bool;

    fn set_vec3(&mut self, name: &str, value: Vec3) -> bool;

    fn set_vec4(&mut self, name: &str, value: Vec4) -> bool;

    fn set_mat4(&mut self, name: &str, value: Mat4) -> bool;

    /// Binds a texture and returns the texture unit it was assigned to.
    fn set_texture(&mut self, name: &str, texture: TextureHandle, filter: TextureFilter)
    -> Option<u32>;
}

/// Renderer / shader-language backend that compiles and links programs.
///
/// Programs are exclusively owned by the compositor's cache once linked and
/// are released by dropping them.
pub trait ShaderBackend {
    type VertexShader;
    type FragmentShader;
    type Program: ProgramParameters;

    /// Name of the language to use when none is requested explicitly.
    fn default_language(&self) -> Option<&str>;

    /// Whether the backend can compile the named language.
    fn supports_language(&self, name: &str) -> bool;

    fn compile_vertex_shader(
        &mut self,
        language: &str,
        source: &str,
        profile: &str,
    ) -> Option<Self::VertexShader>;

    fn compile_fragment_shader(
        &mut self,
        language: &str,
        source: &str,
        profile: &str,
    ) -> Option<Self::FragmentShader>;

    fn link_program(
        &mut self,
        language: &str,
        vertex: Self::VertexShader,
        fragment: Self::FragmentShader,
    ) -> Option<Self::Program>;

    /// Makes `program` the active one. Must be safe to call when it already is.
    fn set_active_program(&mut self, program: &Self::Program) -> bool;
}
