//! Report output
//!
//! The reporter writes diagnostics as soon as a stage produces them and, after a
//! successful compilation, the success message and any textual code. Writes are
//! flushed immediately so diagnostics precede whatever the caller does next.

use crate::{driver::CodeArtifact, error::PipelineStage};
use serde::Serialize;
use shader_session::Diagnostics;
use std::io::{self, Write};

/// Writes compilation reports to a sink
///
/// The first failed write is kept and returned by [`Reporter::finish`]; later
/// writes are still attempted so one bad flush does not hide the rest.
pub struct Reporter<W: Write> {
    out: W,
    write_error: Option<io::Error>,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self { out, write_error: None }
    }

    /// Consumes the reporter and returns the sink, ignoring write failures
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Consumes the reporter and returns the sink, or the first write failure
    pub fn finish(self) -> io::Result<W> {
        match self.write_error {
            Some(error) => Err(error),
            None => Ok(self.out),
        }
    }

    /// Writes a stage's diagnostics, if there are any
    pub fn report_diagnostics(&mut self, diagnostics: Option<&Diagnostics>) {
        let Some(diagnostics) = diagnostics.filter(|d| !d.is_empty()) else {
            return;
        };
        self.write_line(&diagnostics.text());
    }

    /// Writes the success message, followed by the code if it is textual
    ///
    /// Binary code is never written to the report.
    pub fn report_success(&mut self, artifact: &CodeArtifact) {
        self.write_line(&format!("Successfully compiled shader: {}", artifact.shader_name));

        if let Some(text) = artifact.code.as_text() {
            self.write_line(text);
        }
    }

    fn write_line(&mut self, text: &str) {
        let result = writeln!(self.out, "{text}").and_then(|()| self.out.flush());
        if let Err(error) = result {
            tracing::error!(%error, "failed to write report");
            self.write_error.get_or_insert(error);
        }
    }
}

/// Outcome of compiling one shader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Shader name
    pub shader: String,
    /// Whether code was generated
    pub succeeded: bool,
    /// Stage that failed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<PipelineStage>,
    /// Size of the generated code in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_bytes: Option<usize>,
}

/// Outcomes of one run, in compilation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub outcomes: Vec<Outcome>,
}

impl Summary {
    /// Returns true if every shader compiled
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.succeeded)
    }

    /// Number of failed compilations
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded).count()
    }

    /// Process exit status for this run
    ///
    /// # Arguments
    /// * `always_exit_zero` - Report success even if a shader failed
    ///
    /// # Returns
    /// 0 if every shader compiled or `always_exit_zero` is set, 1 otherwise
    pub fn exit_status(&self, always_exit_zero: bool) -> u8 {
        if always_exit_zero || self.all_succeeded() { 0 } else { 1 }
    }

    /// Serializes the summary as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shader_session::{Diagnostic, GlobalSession, SessionDesc, Stage, TargetDesc, TargetFormat};

    fn artifact(format: TargetFormat) -> CodeArtifact {
        let global = GlobalSession::new();
        let session = global.create_session(&SessionDesc {
            targets: vec![TargetDesc {
                format,
                profile: global.find_profile("spirv_1_5"),
                minify: false,
            }],
        });
        let module = session
            .load_module_from_source("ok", "ok.wgsl", crate::sources::SHADER_SOURCE_OK)
            .value
            .unwrap();
        let entry_point = module.find_and_check_entry_point("main", Stage::Vertex).value.unwrap();
        let linked = session.create_composite_component(&[module.into(), entry_point.into()]).value.unwrap().link().value.unwrap();
        CodeArtifact {
            shader_name: "ok.wgsl".to_string(),
            code: linked.entry_point_code(0, 0).value.unwrap(),
        }
    }

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_absent_or_empty_diagnostics_write_nothing() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.report_diagnostics(None);
        reporter.report_diagnostics(Some(&Diagnostics::new()));
        assert_eq!(output(reporter), "");
    }

    #[test]
    fn test_diagnostics_are_written_as_lines() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("a.wgsl", "careful"));

        let mut reporter = Reporter::new(Vec::new());
        reporter.report_diagnostics(Some(&diagnostics));
        assert_eq!(output(reporter), "a.wgsl: warning: careful\n");
    }

    #[test]
    fn test_textual_artifact_is_printed() {
        let artifact = artifact(TargetFormat::Glsl);
        let mut reporter = Reporter::new(Vec::new());
        reporter.report_success(&artifact);

        let text = output(reporter);
        assert!(text.starts_with("Successfully compiled shader: ok.wgsl\n#version 450"));
        assert!(text.contains("void main()"));
    }

    #[test]
    fn test_binary_artifact_is_not_printed() {
        let artifact = artifact(TargetFormat::SpirV);
        assert!(!artifact.code.is_empty());

        let mut reporter = Reporter::new(Vec::new());
        reporter.report_success(&artifact);
        assert_eq!(output(reporter), "Successfully compiled shader: ok.wgsl\n");
    }

    /// Sink whose writes always fail
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_returned_by_finish() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("a.wgsl", "careful"));
        assert_eq!(diagnostics.iter().count(), 1);

        let mut reporter = Reporter::new(BrokenPipe);
        reporter.report_diagnostics(Some(&diagnostics));
        reporter.report_diagnostics(Some(&diagnostics));

        let error = reporter.finish().err().unwrap();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_finish_returns_sink_after_clean_writes() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.report_success(&artifact(TargetFormat::SpirV));
        assert_eq!(reporter.finish().unwrap(), b"Successfully compiled shader: ok.wgsl\n");
    }

    #[test]
    fn test_exit_status() {
        let failed = Summary {
            outcomes: vec![Outcome {
                shader: "error.wgsl".to_string(),
                succeeded: false,
                failed_stage: Some(PipelineStage::EntryPointLookup),
                code_bytes: None,
            }],
        };
        assert_eq!(failed.exit_status(false), 1);
        assert_eq!(failed.exit_status(true), 0);

        let passed = Summary {
            outcomes: vec![Outcome {
                shader: "ok.wgsl".to_string(),
                succeeded: true,
                failed_stage: None,
                code_bytes: Some(4),
            }],
        };
        assert_eq!(passed.exit_status(false), 0);
        assert_eq!(Summary::default().exit_status(false), 0);
    }

    #[test]
    fn test_summary_json() {
        let summary = Summary {
            outcomes: vec![
                Outcome {
                    shader: "error.wgsl".to_string(),
                    succeeded: false,
                    failed_stage: Some(PipelineStage::EntryPointLookup),
                    code_bytes: None,
                },
                Outcome {
                    shader: "ok.wgsl".to_string(),
                    succeeded: true,
                    failed_stage: None,
                    code_bytes: Some(512),
                },
            ],
        };
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failure_count(), 1);

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["outcomes"][0]["failed_stage"], "entry_point_lookup");
        assert_eq!(json["outcomes"][1]["code_bytes"], 512);
        assert!(json["outcomes"][1].get("failed_stage").is_none());
    }
}
