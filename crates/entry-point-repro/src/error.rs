//! Error types of the reproduction driver

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Pipeline stage at which a compilation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Parsing and validating the source module
    ModuleLoad,
    /// Finding the stage-marked entry point
    EntryPointLookup,
    /// Composing the module with the entry point
    Composition,
    /// Linking the composed program
    Link,
    /// Generating target code
    CodeGen,
}

impl PipelineStage {
    /// Human-readable stage name
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::ModuleLoad => "module load",
            PipelineStage::EntryPointLookup => "entry point lookup",
            PipelineStage::Composition => "composition",
            PipelineStage::Link => "link",
            PipelineStage::CodeGen => "code generation",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compilation that stopped at one stage
///
/// `diagnostics` holds the text that was already written to the reporter when
/// the stage failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("failed to load module for shader '{shader}'")]
    ModuleLoad { shader: String, diagnostics: String },
    #[error("entry point not found in shader '{shader}'")]
    EntryPointNotFound { shader: String, diagnostics: String },
    #[error("failed to compose shader '{shader}'")]
    Composition { shader: String, diagnostics: String },
    #[error("failed to link shader '{shader}'")]
    Link { shader: String, diagnostics: String },
    #[error("failed to generate code for shader '{shader}'")]
    CodeGen { shader: String, diagnostics: String },
}

impl CompileError {
    /// Creates the error variant matching `stage`
    pub fn new(stage: PipelineStage, shader: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        let shader = shader.into();
        let diagnostics = diagnostics.into();
        match stage {
            PipelineStage::ModuleLoad => CompileError::ModuleLoad { shader, diagnostics },
            PipelineStage::EntryPointLookup => CompileError::EntryPointNotFound { shader, diagnostics },
            PipelineStage::Composition => CompileError::Composition { shader, diagnostics },
            PipelineStage::Link => CompileError::Link { shader, diagnostics },
            PipelineStage::CodeGen => CompileError::CodeGen { shader, diagnostics },
        }
    }

    /// Stage that failed
    pub fn stage(&self) -> PipelineStage {
        match self {
            CompileError::ModuleLoad { .. } => PipelineStage::ModuleLoad,
            CompileError::EntryPointNotFound { .. } => PipelineStage::EntryPointLookup,
            CompileError::Composition { .. } => PipelineStage::Composition,
            CompileError::Link { .. } => PipelineStage::Link,
            CompileError::CodeGen { .. } => PipelineStage::CodeGen,
        }
    }

    /// Name of the shader that failed
    pub fn shader(&self) -> &str {
        match self {
            CompileError::ModuleLoad { shader, .. }
            | CompileError::EntryPointNotFound { shader, .. }
            | CompileError::Composition { shader, .. }
            | CompileError::Link { shader, .. }
            | CompileError::CodeGen { shader, .. } => shader,
        }
    }

    /// Diagnostic text emitted by the failing stage
    pub fn diagnostics(&self) -> &str {
        match self {
            CompileError::ModuleLoad { diagnostics, .. }
            | CompileError::EntryPointNotFound { diagnostics, .. }
            | CompileError::Composition { diagnostics, .. }
            | CompileError::Link { diagnostics, .. }
            | CompileError::CodeGen { diagnostics, .. } => diagnostics,
        }
    }
}

/// Errors of the application around the driver
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_norway::Error),
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to install logger: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_variant_follows_stage() {
        let stages = [
            PipelineStage::ModuleLoad,
            PipelineStage::EntryPointLookup,
            PipelineStage::Composition,
            PipelineStage::Link,
            PipelineStage::CodeGen,
        ];
        for stage in stages {
            let error = CompileError::new(stage, "a.wgsl", "a.wgsl: error: nope");
            assert_eq!(error.stage(), stage);
            assert_eq!(error.shader(), "a.wgsl");
            assert_eq!(error.diagnostics(), "a.wgsl: error: nope");
        }
    }

    #[test]
    fn test_error_message() {
        let error = CompileError::new(PipelineStage::EntryPointLookup, "error.wgsl", "");
        assert_eq!(error.to_string(), "entry point not found in shader 'error.wgsl'");
        assert_eq!(error.stage().to_string(), "entry point lookup");
    }
}
