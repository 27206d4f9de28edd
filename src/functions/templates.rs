//! Shader Template Catalogue
//!
//! Per-stage shader text lives in embedded minijinja templates, one file per
//! stage and language:
//!
//! ```text
//! src/shaders/<language>/preamble.<language>     version line
//! src/shaders/<language>/signatures.<language>   forward declarations of all stage contracts
//! src/shaders/<language>/<stage>.<language>      every variant of one stage
//! ```
//!
//! A stage template renders one slot of one variant with the context
//! `{slot, kind, num_clip_planes, num_depth_textures}`. A language without
//! templates renders empty text everywhere.
//!
//! In debug builds templates are read from the source tree first, so shader
//! text can be edited without rebuilding.

use std::sync::OnceLock;

use minijinja::{Environment, Error, ErrorKind, context, syntax::SyntaxConfig};
use rust_embed::RustEmbed;

use super::TemplateParams;
use crate::compositor::stage::{SourceSlot, Stage};
use crate::errors::Result;

pub static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/shaders"]
struct ShaderAssets;

pub fn get_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
            .expect("Failed to configure Jinja2 syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);

        env.set_loader(template_loader);

        env
    })
}

fn template_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    #[cfg(debug_assertions)]
    {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src/shaders")
            .join(name);
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(source) => return Ok(Some(source)),
                Err(e) => {
                    return Err(Error::new(
                        ErrorKind::TemplateNotFound,
                        format!("Failed to read file: {e}"),
                    ));
                }
            }
        }
    }

    if let Some(file) = ShaderAssets::get(name)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

/// `glsl/ray_setup.glsl` for (`"GLSL"`, `"ray_setup"`).
fn template_name(language: &str, stem: &str) -> String {
    let language = language.to_ascii_lowercase();
    format!("{language}/{stem}.{language}")
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    let env = get_env();
    let template = match env.get_template(name) {
        Ok(template) => template,
        Err(e) if e.kind() == ErrorKind::TemplateNotFound => return Ok(String::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(template.render(ctx)?)
}

/// Renders one slot of a stage variant.
pub fn render_stage(
    language: &str,
    stage: Stage,
    kind: &str,
    slot: SourceSlot,
    params: TemplateParams,
) -> Result<String> {
    render(
        &template_name(language, stage.as_str()),
        context! {
            slot => slot.as_str(),
            kind => kind,
            num_clip_planes => params.num_clip_planes,
            num_depth_textures => params.num_depth_textures,
        },
    )
}

/// Language version line, prepended to both programs.
pub fn render_preamble(language: &str) -> Result<String> {
    render(&template_name(language, "preamble"), context! {})
}

/// Forward declarations of every stage contract, prepended to the fragment
/// program so the emission order of the bodies does not matter.
pub fn render_signatures(language: &str) -> Result<String> {
    render(&template_name(language, "signatures"), context! {})
}
