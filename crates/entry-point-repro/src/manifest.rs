//! Reproduction manifest parser
//!
//! A YAML manifest names the shaders to compile and the target to compile them
//! for. Shader file paths are resolved relative to the manifest.
//!
//! ```yaml
//! target:
//!   format: glsl
//!   profile: spirv_1_5
//! entry_point: main
//! stage: vertex
//! shaders:
//!   - file: error.wgsl
//!   - name: ok
//!     file: ok.wgsl
//! ```

use crate::{driver::CompileOptions, error::AppError, sources::ShaderSource};
use serde::Deserialize;
use shader_session::{Stage, TargetFormat};
use std::path::{Path, PathBuf};

/// Target section of a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSpec {
    /// Output format (defaults to GLSL)
    #[serde(default)]
    pub format: TargetFormat,
    /// Profile name (defaults to `spirv_1_5`)
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Minify WGSL output
    #[serde(default)]
    pub minify: bool,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            format: TargetFormat::default(),
            profile: default_profile(),
            minify: false,
        }
    }
}

/// A shader listed in a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ShaderEntry {
    /// Display name; the file name is used when absent
    #[serde(default)]
    pub name: Option<String>,
    /// Source file path relative to the manifest
    pub file: String,
}

/// Raw reproduction manifest as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ReproManifest {
    /// Compilation target
    #[serde(default)]
    pub target: TargetSpec,
    /// Entry point function name
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Stage the entry point must be marked for
    #[serde(default)]
    pub stage: Stage,
    /// Shaders to compile, in order
    pub shaders: Vec<ShaderEntry>,
}

fn default_profile() -> String {
    CompileOptions::default().profile
}

fn default_entry_point() -> String {
    CompileOptions::default().entry_point
}

impl ReproManifest {
    /// Parses a manifest from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self, serde_norway::Error> {
        serde_norway::from_str(yaml_content)
    }

    /// Parses a manifest from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Compile options described by the manifest
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            format: self.target.format,
            profile: self.target.profile.clone(),
            entry_point: self.entry_point.clone(),
            stage: self.stage,
            minify: self.target.minify,
        }
    }

    /// Reads every listed shader
    ///
    /// # Arguments
    /// * `base_dir` - Directory the shader paths are relative to
    pub fn load_sources(&self, base_dir: &Path) -> Result<Vec<ShaderSource>, AppError> {
        self.shaders
            .iter()
            .map(|entry| {
                let path = base_dir.join(&entry.file);
                let mut source = ShaderSource::from_file(&path).map_err(|source| AppError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                if let Some(name) = &entry.name {
                    source.name = name.clone();
                }
                Ok(source)
            })
            .collect()
    }
}

/// Command-line choices applied on top of a manifest
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub format: Option<TargetFormat>,
    pub profile: Option<String>,
    pub entry_point: Option<String>,
    pub stage: Option<Stage>,
    /// Minify is only ever switched on, never off
    pub minify: bool,
    /// Extra shader files, compiled after the manifest's shaders
    pub files: Vec<PathBuf>,
}

impl Overrides {
    /// Replaces every option that was given explicitly
    pub fn apply(&self, mut options: CompileOptions) -> CompileOptions {
        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(profile) = &self.profile {
            options.profile = profile.clone();
        }
        if let Some(entry_point) = &self.entry_point {
            options.entry_point = entry_point.clone();
        }
        if let Some(stage) = self.stage {
            options.stage = stage;
        }
        options.minify |= self.minify;
        options
    }
}

/// Resolves the options and sources of a run
///
/// The manifest, if any, is read first and `overrides` win over its values.
/// Without any manifest shader or extra file, the built-in pair is compiled.
///
/// # Arguments
/// * `manifest_path` - Optional YAML manifest
/// * `overrides` - Values given on the command line
pub fn resolve(manifest_path: Option<&Path>, overrides: &Overrides) -> Result<(CompileOptions, Vec<ShaderSource>), AppError> {
    let (options, mut sources) = match manifest_path {
        Some(path) => {
            let manifest = ReproManifest::from_file(path)?;
            let base_dir = path.parent().map(PathBuf::from).unwrap_or_default();
            (manifest.compile_options(), manifest.load_sources(&base_dir)?)
        }
        None => (CompileOptions::default(), Vec::new()),
    };

    for path in &overrides.files {
        let source = ShaderSource::from_file(path).map_err(|source| AppError::Read {
            path: path.display().to_string(),
            source,
        })?;
        sources.push(source);
    }
    if sources.is_empty() {
        sources = crate::sources::builtin_sources();
    }

    Ok((overrides.apply(options), sources))
}
