//! Entry-point attribute reproduction driver
//!
//! Compiles shader sources through the session-based compiler of
//! `shader_session` and reports, for each source, the diagnostics of every
//! stage and either the generated code or the stage that failed. The built-in
//! pair of sources shows that a function named `main` is only a vertex entry
//! point when it carries the `@vertex` attribute.

pub mod driver;
pub mod error;
pub mod manifest;
pub mod reporter;
pub mod sources;

pub use driver::{CodeArtifact, CompileOptions, compile, compile_and_report};
pub use error::{AppError, CompileError, PipelineStage};
pub use reporter::{Outcome, Reporter, Summary};

/// Compiles every source in order and collects the outcomes
///
/// A failing source never stops the ones after it.
pub fn run<W: std::io::Write>(sources: &[sources::ShaderSource], options: &CompileOptions, reporter: &mut Reporter<W>) -> Summary {
    let outcomes = sources
        .iter()
        .map(|source| match compile_and_report(source, options, reporter) {
            Ok(artifact) => Outcome {
                shader: source.name.clone(),
                succeeded: true,
                failed_stage: None,
                code_bytes: Some(artifact.code.len()),
            },
            Err(error) => Outcome {
                shader: source.name.clone(),
                succeeded: false,
                failed_stage: Some(error.stage()),
                code_bytes: None,
            },
        })
        .collect();

    Summary { outcomes }
}
