//! Code generation for linked programs
//!
//! Each target format maps onto one naga backend. GLSL and SPIR-V are written
//! per entry point; WGSL is written for the whole linked program.

use crate::{
    component::LinkedProgram,
    diagnostics::{Diagnosed, Diagnostic, Diagnostics},
    profile::{Profile, TargetFormat},
};
use naga::back::{glsl, spv, wgsl};
use thiserror::Error;

/// Generated target code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlob {
    format: TargetFormat,
    bytes: Vec<u8>,
}

impl CodeBlob {
    /// Format the code was generated in
    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// Raw bytes of the code
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The code as text, if the format is textual
    pub fn as_text(&self) -> Option<&str> {
        if self.format.is_textual() { std::str::from_utf8(&self.bytes).ok() } else { None }
    }

    /// Size of the code in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if no code was generated
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Failures of the naga backends
#[derive(Debug, Error)]
enum BackendError {
    #[error("GLSL backend failed: {0}")]
    Glsl(#[from] glsl::Error),
    #[error("SPIR-V backend failed: {0}")]
    SpirV(#[from] spv::Error),
    #[error("WGSL backend failed: {0}")]
    Wgsl(#[from] wgsl::Error),
    #[error("minified program failed validation: {0}")]
    Minify(naga::WithSpan<naga::valid::ValidationError>),
}

impl LinkedProgram {
    /// Generates code for one entry point and one target
    ///
    /// # Arguments
    /// * `entry_point_index` - Index into [`LinkedProgram::entry_points`]
    /// * `target_index` - Index into the session's targets
    ///
    /// # Returns
    /// The generated code. Out-of-range indices and backend errors are reported as diagnostics.
    pub fn entry_point_code(&self, entry_point_index: usize, target_index: usize) -> Diagnosed<CodeBlob> {
        let Some(entry_point) = self.entry_points().get(entry_point_index) else {
            return Diagnosed::error(&self.path, format!("entry point index {entry_point_index} is out of range ({} linked)", self.entry_points().len()));
        };
        let Some(target) = self.target(target_index) else {
            return Diagnosed::error(&self.path, format!("target index {target_index} is out of range"));
        };

        let format = target.desc.format;
        let generated = match format {
            TargetFormat::Glsl => self.write_glsl(&entry_point.name, entry_point.stage.into(), target.profile).map(String::into_bytes),
            TargetFormat::SpirV => self.write_spirv(&entry_point.name, entry_point.stage.into(), target.profile),
            TargetFormat::Wgsl => self.write_wgsl(target.desc.minify).map(String::into_bytes),
        };

        match generated {
            Ok(bytes) => {
                tracing::debug!(entry_point = entry_point.name.as_str(), %format, bytes = bytes.len(), "generated code");
                Diagnosed::ok(CodeBlob { format, bytes }, Diagnostics::new())
            }
            Err(error) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(Diagnostic::error(&self.path, error));
                Diagnosed::failed(diagnostics)
            }
        }
    }

    fn write_glsl(&self, entry_point: &str, shader_stage: naga::ShaderStage, profile: Option<Profile>) -> Result<String, BackendError> {
        let version = match profile {
            Some(Profile::Glsl(version)) => glsl::Version::Desktop(version),
            Some(Profile::GlslEs(version)) => glsl::Version::new_gles(version),
            // Non-GLSL profiles fall back to desktop 4.50
            _ => glsl::Version::Desktop(450),
        };
        let options = glsl::Options { version, ..glsl::Options::default() };
        let pipeline_options = glsl::PipelineOptions {
            shader_stage,
            entry_point: entry_point.to_string(),
            multiview: None,
        };

        let mut output = String::new();
        let mut writer = glsl::Writer::new(&mut output, &self.ir, &self.info, &options, &pipeline_options, naga::proc::BoundsCheckPolicies::default())?;
        writer.write()?;
        drop(writer);

        Ok(output)
    }

    fn write_spirv(&self, entry_point: &str, shader_stage: naga::ShaderStage, profile: Option<Profile>) -> Result<Vec<u8>, BackendError> {
        let lang_version = match profile {
            Some(Profile::SpirV { major, minor }) => (major, minor),
            _ => (1, 0),
        };
        let options = spv::Options { lang_version, ..spv::Options::default() };
        let pipeline_options = spv::PipelineOptions {
            shader_stage,
            entry_point: entry_point.to_string(),
        };

        let words = spv::write_vec(&self.ir, &self.info, &options, Some(&pipeline_options))?;
        Ok(words.iter().flat_map(|word| word.to_le_bytes()).collect())
    }

    fn write_wgsl(&self, minify: bool) -> Result<String, BackendError> {
        if !minify {
            return Ok(wgsl::write_string(&self.ir, &self.info, wgsl::WriterFlags::empty())?);
        }

        let mut ir = self.ir.clone();
        wgsl_minifier::minify_module(&mut ir);
        let info = crate::validate(&ir).map_err(BackendError::Minify)?;
        let output = wgsl::write_string(&ir, &info, wgsl::WriterFlags::empty())?;

        Ok(wgsl_minifier::minify_wgsl_source(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, GlobalSession, SessionDesc, Stage, TargetDesc};

    const TRIANGLE: &str = r#"
@vertex
fn main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(index) - 1);
    return vec4<f32>(x, 0.0, 0.0, 1.0);
}
"#;

    fn link(format: TargetFormat, profile: &str, minify: bool) -> LinkedProgram {
        let global = GlobalSession::new();
        let session = global.create_session(&SessionDesc {
            targets: vec![TargetDesc {
                format,
                profile: global.find_profile(profile),
                minify,
            }],
        });
        let module = session.load_module_from_source("triangle", "triangle.wgsl", TRIANGLE).value.unwrap();
        let entry_point = module.find_and_check_entry_point("main", Stage::Vertex).value.unwrap();
        let composed = session.create_composite_component(&[module.into(), entry_point.into()]).value.unwrap();
        composed.link().value.unwrap()
    }

    #[test]
    fn test_glsl_output_uses_profile_version() {
        let program = link(TargetFormat::Glsl, "glsl_es_310", false);
        let code = program.entry_point_code(0, 0).value.unwrap();

        let text = code.as_text().unwrap();
        assert!(text.starts_with("#version 310 es"));
        assert!(text.contains("void main()"));
    }

    #[test]
    fn test_spirv_output_is_binary() {
        let program = link(TargetFormat::SpirV, "spirv_1_5", false);
        let code = program.entry_point_code(0, 0).value.unwrap();

        assert_eq!(code.format(), TargetFormat::SpirV);
        assert!(code.as_text().is_none());
        assert_eq!(code.len() % 4, 0);
        // SPIR-V magic number, little-endian
        assert_eq!(&code.as_bytes()[..4], &[0x03, 0x02, 0x23, 0x07]);
        // Version word 0x00010500 for SPIR-V 1.5
        assert_eq!(&code.as_bytes()[4..8], &[0x00, 0x05, 0x01, 0x00]);
    }

    #[test]
    fn test_wgsl_output_with_and_without_minify() {
        let plain = link(TargetFormat::Wgsl, "wgsl", false).entry_point_code(0, 0).value.unwrap();
        let minified = link(TargetFormat::Wgsl, "wgsl", true).entry_point_code(0, 0).value.unwrap();

        assert!(plain.as_text().unwrap().contains("@vertex"));
        assert!(minified.as_text().unwrap().contains("@vertex"));
        assert!(minified.len() <= plain.len());
    }

    #[test]
    fn test_out_of_range_indices() {
        let program = link(TargetFormat::Glsl, "glsl_450", false);

        let result = program.entry_point_code(1, 0);
        assert!(!result.is_ok());
        assert_eq!(result.diagnostics.text(), "triangle.wgsl: error: entry point index 1 is out of range (1 linked)");

        let result = program.entry_point_code(0, 3);
        assert_eq!(result.diagnostics.text(), "triangle.wgsl: error: target index 3 is out of range");
    }

    #[test]
    fn test_module_only_program_has_no_entry_point_code() {
        let global = GlobalSession::new();
        let session = global.create_session(&SessionDesc {
            targets: vec![TargetDesc {
                format: TargetFormat::Glsl,
                profile: global.find_profile("glsl_450"),
                minify: false,
            }],
        });
        let module = session.load_module_from_source("triangle", "triangle.wgsl", TRIANGLE).value.unwrap();
        let program = Component::from(module).link().value.unwrap();

        assert!(program.entry_points().is_empty());
        assert!(!program.entry_point_code(0, 0).is_ok());
    }
}
