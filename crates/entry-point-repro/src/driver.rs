//! Compilation driver
//!
//! Runs one shader source through the compiler in a fixed order: global
//! session, session, module load, entry-point lookup, composition, link and
//! code generation. Each stage's diagnostics are reported as soon as the stage
//! returns, and the first failing stage ends the compilation.

use crate::{
    error::{CompileError, PipelineStage},
    reporter::Reporter,
    sources::ShaderSource,
};
use shader_session::{CodeBlob, Diagnosed, GlobalSession, SessionDesc, Stage, TargetDesc, TargetFormat};
use std::io::Write;

/// Choices made when compiling a shader
///
/// The default reproduces the reference run: GLSL text with the `spirv_1_5`
/// profile, vertex entry point `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Output format of the single target
    pub format: TargetFormat,
    /// Profile name, resolved through the global session
    pub profile: String,
    /// Entry point function name
    pub entry_point: String,
    /// Stage the entry point must be marked for
    pub stage: Stage,
    /// Minify WGSL output
    pub minify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            format: TargetFormat::Glsl,
            profile: "spirv_1_5".to_string(),
            entry_point: "main".to_string(),
            stage: Stage::Vertex,
            minify: false,
        }
    }
}

/// Code generated for a shader
#[derive(Debug, Clone)]
pub struct CodeArtifact {
    /// Name of the compiled shader
    pub shader_name: String,
    /// Generated code for entry point 0, target 0
    pub code: CodeBlob,
}

/// Compiles one shader source
///
/// # Arguments
/// * `source` - WGSL source text
/// * `name` - Shader name, used as module name and file name
/// * `options` - Target and entry point selection
/// * `reporter` - Receives each stage's diagnostics immediately
///
/// # Returns
/// The generated code, or the error of the first failing stage
pub fn compile<W: Write>(source: &str, name: &str, options: &CompileOptions, reporter: &mut Reporter<W>) -> Result<CodeArtifact, CompileError> {
    let global_session = GlobalSession::new();

    let target = TargetDesc {
        format: options.format,
        profile: global_session.find_profile(&options.profile),
        minify: options.minify,
    };
    let session = global_session.create_session(&SessionDesc { targets: vec![target] });

    let module = checked(reporter, PipelineStage::ModuleLoad, name, session.load_module_from_source(name, name, source))?;

    let entry_point = checked(
        reporter,
        PipelineStage::EntryPointLookup,
        name,
        module.find_and_check_entry_point(&options.entry_point, options.stage),
    )?;

    let composed = checked(
        reporter,
        PipelineStage::Composition,
        name,
        session.create_composite_component(&[module.into(), entry_point.into()]),
    )?;

    let linked = checked(reporter, PipelineStage::Link, name, composed.link())?;

    let code = checked(reporter, PipelineStage::CodeGen, name, linked.entry_point_code(0, 0))?;

    tracing::info!(shader = name, format = %options.format, bytes = code.len(), "compiled shader");

    Ok(CodeArtifact {
        shader_name: name.to_string(),
        code,
    })
}

/// Compiles a source and reports the result
///
/// Failures are logged and returned; they never prevent later compilations.
pub fn compile_and_report<W: Write>(source: &ShaderSource, options: &CompileOptions, reporter: &mut Reporter<W>) -> Result<CodeArtifact, CompileError> {
    let result = compile(&source.text, &source.name, options, reporter);
    match &result {
        Ok(artifact) => reporter.report_success(artifact),
        Err(error) => tracing::warn!(shader = error.shader(), stage = %error.stage(), "{error}"),
    }
    result
}

/// Reports a stage's diagnostics and unwraps its value
fn checked<T, W: Write>(reporter: &mut Reporter<W>, stage: PipelineStage, name: &str, result: Diagnosed<T>) -> Result<T, CompileError> {
    let (value, diagnostics) = result.into_parts();
    reporter.report_diagnostics(Some(&diagnostics));

    match value {
        Some(value) => {
            tracing::debug!(shader = name, %stage, "stage succeeded");
            Ok(value)
        }
        None => Err(CompileError::new(stage, name, diagnostics.text())),
    }
}
