//! Shared test doubles: a recording shader backend, a scripted scene and
//! scripted volume resources.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use glam::{Mat4, UVec3, Vec3, Vec4};
use rustc_hash::FxHashMap;
use volume_compositor::{
    PrimitiveKind, ProgramParameters, ScalarTexture, ScenePrimitive, SceneQuery, ShaderBackend,
    TextureDimension, TextureFilter, TextureHandle, TransferFunctionFlavor, VolumeResources,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(TextureHandle, TextureFilter),
}

#[derive(Debug, Default)]
pub struct MockProgram {
    pub id: u32,
    pub vertex_source: String,
    pub fragment_source: String,
    uniforms: FxHashMap<String, Uniform>,
    next_unit: u32,
}

impl MockProgram {
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn num_uniforms(&self) -> usize {
        self.uniforms.len()
    }

    fn set(&mut self, name: &str, value: Uniform) -> bool {
        self.uniforms.insert(name.to_string(), value);
        true
    }
}

impl ProgramParameters for MockProgram {
    fn set_float(&mut self, name: &str, value: f32) -> bool {
        self.set(name, Uniform::Float(value))
    }

    fn set_int(&mut self, name: &str, value: i32) -> bool {
        self.set(name, Uniform::Int(value))
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) -> bool {
        self.set(name, Uniform::Vec3(value))
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) -> bool {
        self.set(name, Uniform::Vec4(value))
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) -> bool {
        self.set(name, Uniform::Mat4(value))
    }

    fn set_texture(&mut self, name: &str, texture: TextureHandle, filter: TextureFilter) -> Option<u32> {
        self.set(name, Uniform::Texture(texture, filter));
        let unit = self.next_unit;
        self.next_unit += 1;
        Some(unit)
    }
}

/// Compiles everything unless told to fail, and records what it was given.
#[derive(Debug)]
pub struct MockBackend {
    pub languages: Vec<&'static str>,
    pub default_language: Option<&'static str>,
    pub fail_vertex: bool,
    pub fail_fragment: bool,
    pub fail_link: bool,
    pub fail_activation: bool,
    /// (source, profile) of every vertex compile request.
    pub vertex_compiles: Vec<(String, String)>,
    /// (source, profile) of every fragment compile request.
    pub fragment_compiles: Vec<(String, String)>,
    pub links: usize,
    pub active_program: Option<u32>,
    pub next_program: u32,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            languages: vec!["GLSL"],
            default_language: Some("GLSL"),
            fail_vertex: false,
            fail_fragment: false,
            fail_link: false,
            fail_activation: false,
            vertex_compiles: Vec::new(),
            fragment_compiles: Vec::new(),
            links: 0,
            active_program: None,
            next_program: 1,
        }
    }
}

impl MockBackend {
    pub fn compile_requests(&self) -> usize {
        self.vertex_compiles.len()
    }
}

impl ShaderBackend for MockBackend {
    type VertexShader = String;
    type FragmentShader = String;
    type Program = MockProgram;

    fn default_language(&self) -> Option<&str> {
        self.default_language
    }

    fn supports_language(&self, name: &str) -> bool {
        self.languages.iter().any(|language| *language == name)
    }

    fn compile_vertex_shader(&mut self, _language: &str, source: &str, profile: &str) -> Option<String> {
        self.vertex_compiles.push((source.to_string(), profile.to_string()));
        (!self.fail_vertex).then(|| source.to_string())
    }

    fn compile_fragment_shader(&mut self, _language: &str, source: &str, profile: &str) -> Option<String> {
        self.fragment_compiles.push((source.to_string(), profile.to_string()));
        (!self.fail_fragment).then(|| source.to_string())
    }

    fn link_program(&mut self, _language: &str, vertex: String, fragment: String) -> Option<MockProgram> {
        if self.fail_link {
            return None;
        }
        self.links += 1;
        let id = self.next_program;
        self.next_program += 1;
        Some(MockProgram {
            id,
            vertex_source: vertex,
            fragment_source: fragment,
            ..MockProgram::default()
        })
    }

    fn set_active_program(&mut self, program: &MockProgram) -> bool {
        if self.fail_activation {
            return false;
        }
        self.active_program = Some(program.id);
        true
    }
}

// ============================================================================
// Scene & Resources
// ============================================================================

/// Scene returning a fixed primitive list and counting every query.
#[derive(Debug, Default)]
pub struct MockScene {
    pub primitives: Vec<ScenePrimitive>,
    pub depth_texture: Option<TextureHandle>,
    pub queries: RefCell<Vec<PrimitiveKind>>,
    pub depth_queries: Cell<usize>,
}

impl MockScene {
    pub fn with(primitives: Vec<ScenePrimitive>) -> Self {
        Self {
            primitives,
            ..Self::default()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len() + self.depth_queries.get()
    }

    pub fn was_queried(&self, kind: PrimitiveKind) -> bool {
        self.queries.borrow().contains(&kind)
    }
}

impl SceneQuery for MockScene {
    fn intersecting(&self, kind: PrimitiveKind) -> Vec<ScenePrimitive> {
        self.queries.borrow_mut().push(kind);
        self.primitives
            .iter()
            .filter(|primitive| primitive.kind() == kind)
            .copied()
            .collect()
    }

    fn depth_texture(&self) -> Option<TextureHandle> {
        self.depth_queries.set(self.depth_queries.get() + 1);
        self.depth_texture
    }
}

#[derive(Debug, Default)]
pub struct MockResources {
    pub scalar_texture: Option<ScalarTexture>,
    pub transfer_functions: Vec<(TransferFunctionFlavor, TextureHandle)>,
    pub queries: Cell<usize>,
}

impl MockResources {
    /// A 3-D scalar field of 128^3 voxels with every transfer-function flavor.
    pub fn complete() -> Self {
        Self {
            scalar_texture: Some(ScalarTexture {
                handle: TextureHandle(100),
                dimension: TextureDimension::D3,
                size: UVec3::splat(128),
            }),
            transfer_functions: vec![
                (TransferFunctionFlavor::Standard, TextureHandle(200)),
                (TransferFunctionFlavor::PreMultiplied, TextureHandle(201)),
                (TransferFunctionFlavor::PreIntegrated, TextureHandle(202)),
            ],
            queries: Cell::new(0),
        }
    }
}

impl VolumeResources for MockResources {
    fn scalar_texture(&self) -> Option<ScalarTexture> {
        self.queries.set(self.queries.get() + 1);
        self.scalar_texture
    }

    fn transfer_function(&self, flavor: TransferFunctionFlavor) -> Option<TextureHandle> {
        self.queries.set(self.queries.get() + 1);
        self.transfer_functions
            .iter()
            .find(|(f, _)| *f == flavor)
            .map(|(_, handle)| *handle)
    }
}

pub fn clip_plane(plane: Vec4) -> ScenePrimitive {
    ScenePrimitive::ClipPlane {
        plane,
        inverted: false,
    }
}

pub fn directional_light() -> ScenePrimitive {
    ScenePrimitive::DirectionalLight {
        direction: Vec3::NEG_Y,
        color: Vec3::ONE,
    }
}
