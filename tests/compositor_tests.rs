//! Compositor Integration Tests
//!
//! Tests for:
//! - Selection: determinism, null totality, clip ray cases, query gating
//! - Composition cache: single compile per identity, clearing, failures
//! - Per-draw binding of the discovered scene state

mod common;

use common::{
    MockBackend, MockResources, MockScene, Uniform, clip_plane, directional_light, init_logger,
};
use glam::{Mat4, Vec3, Vec4};
use volume_compositor::settings::{Classification, RayTraversal, Shading};
use volume_compositor::{
    BuiltinVariant, CompositorError, CompositorFlags, CompositorSettings, Compositor,
    DrawRequest, DrawTransforms, FunctionRegistry, PrimitiveKind, Stage, TemplateParams,
    TextureHandle, VolumeSettings,
};

fn request<'a>(
    volume: &'a VolumeSettings,
    scene: &'a MockScene,
    resources: &'a MockResources,
) -> DrawRequest<'a> {
    DrawRequest {
        volume,
        scene,
        resources,
        transforms: DrawTransforms::default(),
    }
}

fn compositor() -> Compositor<MockBackend> {
    init_logger();
    Compositor::new(CompositorSettings::default())
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn selection_is_deterministic() {
    let compositor = compositor();
    let backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::with(vec![clip_plane(Vec4::X), directional_light()]);
    let resources = MockResources::complete();

    let a = compositor.select(&backend, &request(&volume, &scene, &resources)).unwrap();
    let b = compositor.select(&backend, &request(&volume, &scene, &resources)).unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(a.id.checksum(), b.id.checksum());
    assert_eq!(a.choices, b.choices);
}

#[test]
fn null_totality_without_any_input() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::default();

    let key = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    let composition = compositor.composition(key).unwrap();
    assert!(composition.id().is_valid(compositor.registry()));
    assert_eq!(backend.links, 1);
}

#[test]
fn fully_suppressed_selection_issues_no_queries() {
    init_logger();
    let settings = CompositorSettings {
        flags: CompositorFlags::all(),
        ..Default::default()
    };
    let mut compositor = Compositor::<MockBackend>::new(settings);
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::with(vec![clip_plane(Vec4::X), directional_light()]);
    let resources = MockResources::complete();

    let selection = compositor
        .select(&backend, &request(&volume, &scene, &resources))
        .unwrap();
    for stage in Stage::ALL {
        assert_eq!(selection.choices.get(stage), BuiltinVariant::null_of(stage));
    }
    assert_eq!(scene.query_count(), 0);
    assert_eq!(resources.queries.get(), 0);

    compositor.get_or_create(&mut backend, &selection.id).unwrap();
}

#[test]
fn suppressed_clip_ray_skips_plane_and_depth_queries() {
    init_logger();
    let settings = CompositorSettings {
        flags: CompositorFlags::NO_CLIP_RAY,
        ..Default::default()
    };
    let compositor = Compositor::<MockBackend>::new(settings);
    let backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    compositor
        .select(&backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert!(!scene.was_queried(PrimitiveKind::ClipPlane));
    assert_eq!(scene.depth_queries.get(), 0);
    assert!(scene.was_queried(PrimitiveKind::ClipBox));
}

#[test]
fn lighting_query_skipped_for_unlit_volume() {
    let compositor = compositor();
    let backend = MockBackend::default();
    let volume = VolumeSettings {
        lighting: false,
        ..Default::default()
    };
    let scene = MockScene::with(vec![directional_light()]);
    let resources = MockResources::complete();

    let selection = compositor
        .select(&backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert!(!scene.was_queried(PrimitiveKind::DirectionalLight));
    assert_eq!(selection.choices.get(Stage::Shading), BuiltinVariant::ShadingNull);
    assert_eq!(selection.choices.get(Stage::Illumination), BuiltinVariant::IlluminationNull);
}

#[test]
fn clip_ray_cases_follow_scene() {
    let compositor = compositor();
    let backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let resources = MockResources::complete();

    let cases = [
        (vec![], None, BuiltinVariant::ClipRayNull, TemplateParams::NONE),
        (
            vec![clip_plane(Vec4::X)],
            None,
            BuiltinVariant::ClipRayPlane,
            TemplateParams::new(1, 0),
        ),
        (
            vec![],
            Some(TextureHandle(5)),
            BuiltinVariant::ClipRayDepthTexture,
            TemplateParams::new(0, 1),
        ),
        (
            vec![clip_plane(Vec4::X), clip_plane(Vec4::Y)],
            Some(TextureHandle(5)),
            BuiltinVariant::ClipRayTemplate,
            TemplateParams::new(2, 1),
        ),
    ];

    for (primitives, depth_texture, variant, params) in cases {
        let scene = MockScene {
            depth_texture,
            ..MockScene::with(primitives)
        };
        let selection = compositor
            .select(&backend, &request(&volume, &scene, &resources))
            .unwrap();
        assert_eq!(selection.choices.get(Stage::ClipRay), variant);
        assert_eq!(selection.id.clip_params(), params);
    }
}

// ============================================================================
// Composition Cache
// ============================================================================

#[test]
fn same_identity_compiles_once() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::with(vec![directional_light()]);
    let resources = MockResources::complete();

    let first = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    let second = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.compile_requests(), 1);
    assert_eq!(compositor.num_compositions(), 1);

    let stats = compositor.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.compiled, 1);
    assert_eq!(stats.failed, 0);
}

#[test]
fn different_identities_share_function_instances() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let resources = MockResources::complete();
    let scene = MockScene::default();

    let mip = VolumeSettings {
        ray_traversal: RayTraversal::Mip,
        ..Default::default()
    };
    let dvr = VolumeSettings::default();

    let a = compositor
        .prepare_draw(&mut backend, &request(&mip, &scene, &resources))
        .unwrap();
    let functions_after_first = compositor.num_functions();
    let b = compositor
        .prepare_draw(&mut backend, &request(&dvr, &scene, &resources))
        .unwrap();

    assert_ne!(a, b);
    assert_eq!(compositor.num_compositions(), 2);
    // Only the ray traversal instance is new
    assert_eq!(compositor.num_functions(), functions_after_first + 1);

    let a = compositor.composition(a).unwrap();
    let b = compositor.composition(b).unwrap();
    assert_eq!(a.function(Stage::FetchScalar), b.function(Stage::FetchScalar));
    assert_ne!(a.function(Stage::RayTraversal), b.function(Stage::RayTraversal));
}

#[test]
fn missing_shading_variant_is_invalid() {
    init_logger();
    let mut registry = FunctionRegistry::builtin();
    assert!(registry.remove("ShadingNull"));

    let settings = CompositorSettings {
        flags: CompositorFlags::NO_SHADING,
        ..Default::default()
    };
    let mut compositor = Compositor::<MockBackend>::with_registry(settings, registry);
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let result = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources));
    match result {
        Err(CompositorError::InvalidComposition { stages }) => {
            assert_eq!(stages, vec![Stage::Shading]);
        }
        other => panic!("expected invalid composition, got {other:?}"),
    }
    assert_eq!(backend.compile_requests(), 0);
    assert_eq!(compositor.num_compositions(), 0);
}

#[test]
fn clear_cache_invalidates_handles() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let before = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    compositor.clear_cache();

    assert!(compositor.composition(before).is_none());
    assert_eq!(compositor.num_compositions(), 0);
    assert_eq!(compositor.num_functions(), 0);

    let after = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert_ne!(before, after);
    assert_eq!(backend.compile_requests(), 2);
    assert!(!compositor.bind(
        &mut backend,
        before,
        &volume_compositor::DrawContext::default()
    ));
}

#[test]
fn compile_failure_is_not_cached() {
    let mut compositor = compositor();
    let mut backend = MockBackend {
        fail_fragment: true,
        ..MockBackend::default()
    };
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let result = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources));
    assert!(matches!(
        result,
        Err(CompositorError::FragmentShaderCompilation { .. })
    ));
    assert_eq!(compositor.num_compositions(), 0);
    assert_eq!(compositor.stats().failed, 1);

    // A later request retries
    backend.fail_fragment = false;
    compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert_eq!(compositor.num_compositions(), 1);
    assert_eq!(compositor.stats().compiled, 1);
}

#[test]
fn link_failure_is_reported() {
    let mut compositor = compositor();
    let mut backend = MockBackend {
        fail_link: true,
        ..MockBackend::default()
    };
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let result = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources));
    assert!(matches!(result, Err(CompositorError::ProgramLink { .. })));
    assert_eq!(compositor.num_compositions(), 0);
}

#[test]
fn activation_failure_is_reported() -> anyhow::Result<()> {
    let mut compositor = compositor();
    let mut backend = MockBackend {
        fail_activation: true,
        ..MockBackend::default()
    };
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let result = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources));
    assert!(matches!(result, Err(CompositorError::Activation { .. })));
    assert_eq!(backend.active_program, None);

    // The linked program stays cached; the next draw only retries activation.
    assert_eq!(compositor.num_compositions(), 1);
    backend.fail_activation = false;
    let key = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources))?;
    assert_eq!(backend.links, 1);
    assert_eq!(
        backend.active_program,
        compositor.composition(key).map(|composition| composition.program().id)
    );
    Ok(())
}

// ============================================================================
// Language Resolution
// ============================================================================

#[test]
fn unavailable_language_is_an_error() {
    init_logger();
    let settings = CompositorSettings {
        shader_language: Some("HLSL".to_string()),
        ..Default::default()
    };
    let mut compositor = Compositor::<MockBackend>::new(settings);
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let result = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources));
    assert!(matches!(
        result,
        Err(CompositorError::UnknownShaderLanguage(name)) if name == "HLSL"
    ));
    assert_eq!(backend.compile_requests(), 0);
}

#[test]
fn missing_default_language_is_an_error() {
    let mut compositor = compositor();
    let mut backend = MockBackend {
        default_language: None,
        ..MockBackend::default()
    };
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let result = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources));
    assert!(matches!(result, Err(CompositorError::NoDefaultShaderLanguage)));
}

// ============================================================================
// Source Assembly & Binding
// ============================================================================

#[test]
fn sources_use_language_profiles() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let key = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();

    assert_eq!(backend.vertex_compiles[0].1, "glslv");
    assert_eq!(backend.fragment_compiles[0].1, "glslf");

    let composition = compositor.composition(key).unwrap();
    assert!(composition.vertex_source().starts_with("#version 330 core\n"));
    assert!(composition.fragment_source().contains("vec4 Classification("));
    assert_eq!(composition.program().fragment_source, composition.fragment_source());

    let dump = compositor.dump(key).unwrap();
    assert!(dump.contains("Composition [GLSL]"));
    assert!(dump.contains("--- fragment ---"));
}

#[test]
fn clip_planes_are_uploaded() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::with(vec![
        clip_plane(Vec4::new(1.0, 0.0, 0.0, -0.25)),
        clip_plane(Vec4::new(0.0, 1.0, 0.0, 0.5)),
    ]);
    let resources = MockResources::complete();

    let key = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    let composition = compositor.composition(key).unwrap();

    assert!(composition.fragment_source().contains("uniform vec4 ClipPlanes[2];"));
    let program = composition.program();
    assert_eq!(
        program.uniform("ClipPlanes[0]"),
        Some(&Uniform::Vec4(Vec4::new(1.0, 0.0, 0.0, -0.25)))
    );
    assert_eq!(
        program.uniform("ClipPlanes[1]"),
        Some(&Uniform::Vec4(Vec4::new(0.0, 1.0, 0.0, 0.5)))
    );
    assert_eq!(program.uniform("InvertClipPlanes[0]"), Some(&Uniform::Int(0)));
    assert_eq!(backend.active_program, Some(program.id));
}

#[test]
fn clip_plane_follows_object_transform() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::with(vec![clip_plane(Vec4::new(1.0, 0.0, 0.0, -3.0))]);
    let resources = MockResources::complete();
    let draw = DrawRequest {
        transforms: DrawTransforms {
            object_to_world: Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            ..DrawTransforms::default()
        },
        ..request(&volume, &scene, &resources)
    };

    let key = compositor.prepare_draw(&mut backend, &draw).unwrap();
    let program = compositor.composition(key).unwrap().program();
    let Some(Uniform::Vec4(plane)) = program.uniform("ClipPlane") else {
        panic!("ClipPlane not bound");
    };
    assert!((*plane - Vec4::new(1.0, 0.0, 0.0, -1.0)).length() < 1e-5);
}

#[test]
fn lit_volume_binds_light_and_transfer_function() {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::with(vec![directional_light()]);
    let resources = MockResources::complete();

    let selection = compositor
        .select(&backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert_eq!(
        selection.choices.get(Stage::Shading),
        BuiltinVariant::ShadingLightingThreshold
    );

    let key = compositor
        .prepare_draw(&mut backend, &request(&volume, &scene, &resources))
        .unwrap();
    let program = compositor.composition(key).unwrap().program();

    let Some(Uniform::Vec3(direction)) = program.uniform("LightDirection") else {
        panic!("LightDirection not bound");
    };
    assert!((*direction - Vec3::Y).length() < 1e-5);
    assert!(matches!(
        program.uniform("TransferFunction"),
        Some(Uniform::Texture(TextureHandle(200), _))
    ));
    assert!(matches!(
        program.uniform("VolumeTexture"),
        Some(Uniform::Texture(TextureHandle(100), _))
    ));
    assert_eq!(program.uniform("StepSize"), Some(&Uniform::Float(1.0 / 128.0)));
}

#[test]
fn missing_transfer_function_falls_back_to_null_classification() {
    let compositor = compositor();
    let backend = MockBackend::default();
    let volume = VolumeSettings {
        classification: Classification::PreIntegration,
        ..Default::default()
    };
    let scene = MockScene::default();
    let resources = MockResources {
        transfer_functions: Vec::new(),
        ..MockResources::complete()
    };

    let selection = compositor
        .select(&backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert_eq!(
        selection.choices.get(Stage::Classification),
        BuiltinVariant::ClassificationNull
    );
}

#[test]
fn settings_load_from_json() {
    init_logger();
    let settings = CompositorSettings::from_json_str(
        r#"{ "flags": "NO_JITTER_POSITION", "shader_language": "GLSL" }"#,
    )
    .unwrap();
    let compositor = Compositor::<MockBackend>::new(settings);
    let backend = MockBackend::default();
    let volume = VolumeSettings::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let selection = compositor
        .select(&backend, &request(&volume, &scene, &resources))
        .unwrap();
    assert_eq!(
        selection.choices.get(Stage::JitterPosition),
        BuiltinVariant::JitterPositionNull
    );
    assert_eq!(selection.id.language_name(), "GLSL");
}

#[test]
fn oversized_texture_lod_does_not_overflow() -> anyhow::Result<()> {
    init_logger();
    let settings = CompositorSettings::from_json_str(r#"{ "global_volume_texture_lod": 4294967295 }"#)?;
    let volume = VolumeSettings::from_json_str(r#"{ "volume_texture_lod": 1 }"#)?;
    let mut compositor = Compositor::<MockBackend>::new(settings);
    let mut backend = MockBackend::default();
    let scene = MockScene::default();
    let resources = MockResources::complete();

    let key = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources))?;
    let program = compositor.composition(key).unwrap().program();
    // Every mip level collapses to a single voxel.
    assert_eq!(program.uniform("StepSize"), Some(&Uniform::Float(1.0)));
    Ok(())
}

#[test]
fn light_direction_debug_binds_light_on_unlit_volume() -> anyhow::Result<()> {
    let mut compositor = compositor();
    let mut backend = MockBackend::default();
    let volume = VolumeSettings {
        shading: Shading::DebugLightDirection,
        lighting: false,
        ..Default::default()
    };
    let scene = MockScene::with(vec![directional_light()]);
    let resources = MockResources::complete();

    let selection = compositor.select(&backend, &request(&volume, &scene, &resources))?;
    assert_eq!(
        selection.choices.get(Stage::Shading),
        BuiltinVariant::ShadingDebugLightDirection
    );
    assert_eq!(selection.choices.get(Stage::Illumination), BuiltinVariant::IlluminationNull);

    let key = compositor.prepare_draw(&mut backend, &request(&volume, &scene, &resources))?;
    let program = compositor.composition(key).unwrap().program();
    let Some(Uniform::Vec3(direction)) = program.uniform("LightDirection") else {
        panic!("LightDirection not bound");
    };
    assert!((*direction - Vec3::Y).length() < 1e-5);
    Ok(())
}
