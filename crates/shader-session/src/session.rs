//! Global sessions, sessions, modules and entry points
//!
//! Handles are reference counted: an entry point keeps its module alive, and a
//! module keeps the state of the session that loaded it alive. Dropping the
//! last handle releases everything, on every exit path.

use crate::{
    diagnostics::{Diagnosed, Diagnostic, Diagnostics, Severity},
    profile::{PREDEFINED_PROFILES, Profile, ProfileId, SessionDesc, Stage, TargetDesc},
};
use std::rc::Rc;

/// Process-wide compiler context owning the profile registry
#[derive(Debug, Clone)]
pub struct GlobalSession {
    profiles: &'static [(&'static str, Profile)],
}

impl GlobalSession {
    /// Creates a global session with the predefined profile registry
    pub fn new() -> Self {
        Self { profiles: PREDEFINED_PROFILES }
    }

    /// Resolves a profile name
    ///
    /// # Returns
    /// The profile id, or [`ProfileId::UNKNOWN`] if no profile has this name
    pub fn find_profile(&self, name: &str) -> ProfileId {
        match self.profiles.iter().position(|(profile_name, _)| *profile_name == name) {
            Some(index) => ProfileId(index as u32 + 1),
            None => {
                tracing::debug!(profile = name, "profile not found");
                ProfileId::UNKNOWN
            }
        }
    }

    /// Looks up the profile behind an id
    pub fn profile(&self, id: ProfileId) -> Option<Profile> {
        let index = id.0.checked_sub(1)? as usize;
        self.profiles.get(index).map(|(_, profile)| *profile)
    }

    /// Returns the registered name of a profile id
    pub fn profile_name(&self, id: ProfileId) -> Option<&'static str> {
        let index = id.0.checked_sub(1)? as usize;
        self.profiles.get(index).map(|(name, _)| *name)
    }

    /// Creates a compilation session for the given targets
    ///
    /// Profiles are resolved here; unknown ones are kept and reported at link time.
    pub fn create_session(&self, desc: &SessionDesc) -> Session {
        let targets = desc
            .targets
            .iter()
            .map(|target| Target {
                desc: *target,
                profile: self.profile(target.profile),
            })
            .collect();

        Session {
            shared: Rc::new(SessionShared { targets }),
        }
    }
}

impl Default for GlobalSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A target of a session with its profile resolved
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target {
    pub(crate) desc: TargetDesc,
    pub(crate) profile: Option<Profile>,
}

#[derive(Debug)]
pub(crate) struct SessionShared {
    pub(crate) targets: Vec<Target>,
}

/// A compilation context with a fixed list of targets
#[derive(Debug)]
pub struct Session {
    pub(crate) shared: Rc<SessionShared>,
}

impl Session {
    /// Number of targets configured for this session
    pub fn target_count(&self) -> usize {
        self.shared.targets.len()
    }

    /// Parses and validates WGSL source text as a module
    ///
    /// # Arguments
    /// * `module_name` - Name the module is known by
    /// * `path` - File name used in diagnostics
    /// * `source` - WGSL source text
    ///
    /// # Returns
    /// The module on success. A module that declares no entry points loads with a warning.
    pub fn load_module_from_source(&self, module_name: &str, path: &str, source: &str) -> Diagnosed<Module> {
        let mut diagnostics = Diagnostics::new();

        let ir = match naga::front::wgsl::parse_str(source) {
            Ok(ir) => ir,
            Err(error) => {
                diagnostics.push(Diagnostic::rendered(Severity::Error, error.emit_to_string_with_path(source, path)));
                return Diagnosed::failed(diagnostics);
            }
        };

        if let Err(error) = crate::validate(&ir) {
            diagnostics.push(Diagnostic::rendered(Severity::Error, error.emit_to_string_with_path(source, path)));
            return Diagnosed::failed(diagnostics);
        }

        if ir.entry_points.is_empty() {
            diagnostics.push(Diagnostic::warning(path, format!("module '{module_name}' declares no entry points")));
        }

        tracing::debug!(module = module_name, entry_points = ir.entry_points.len(), "loaded module");

        let module = Module {
            inner: Rc::new(ModuleData {
                session: Rc::clone(&self.shared),
                name: module_name.to_string(),
                path: path.to_string(),
                source: source.to_string(),
                ir,
            }),
        };
        Diagnosed::ok(module, diagnostics)
    }
}

#[derive(Debug)]
pub(crate) struct ModuleData {
    pub(crate) session: Rc<SessionShared>,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) source: String,
    pub(crate) ir: naga::Module,
}

/// A parsed and validated source module
#[derive(Debug, Clone)]
pub struct Module {
    pub(crate) inner: Rc<ModuleData>,
}

impl Module {
    /// Name given when the module was loaded
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// File name used in diagnostics
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Names and stages of the entry points declared by the module
    pub fn entry_points(&self) -> Vec<(String, Option<Stage>)> {
        self.inner.ir.entry_points.iter().map(|ep| (ep.name.clone(), Stage::from_naga(ep.stage))).collect()
    }

    /// Finds the entry point `name` marked for `stage`
    ///
    /// A function is only an entry point if it carries the stage attribute
    /// (`@vertex`, `@fragment`, `@compute`). An unmarked function with the
    /// requested name is reported with a note pointing at the missing attribute.
    pub fn find_and_check_entry_point(&self, name: &str, stage: Stage) -> Diagnosed<EntryPoint> {
        let path = self.path();
        let ir = &self.inner.ir;

        if let Some(index) = ir.entry_points.iter().position(|ep| ep.name == name && ep.stage == stage.into()) {
            tracing::debug!(module = self.name(), entry_point = name, %stage, "found entry point");
            return Diagnosed::ok(EntryPoint { module: self.clone(), index, stage }, Diagnostics::new());
        }

        if let Some(other) = ir.entry_points.iter().find(|ep| ep.name == name) {
            let other_stage = Stage::from_naga(other.stage).map_or("another", |s| s.name());
            return Diagnosed::error(path, format!("entry point '{name}' is declared for the {other_stage} stage, not the {stage} stage"));
        }

        let mut diagnostics = Diagnostics::new();
        if ir.functions.iter().any(|(_, function)| function.name.as_deref() == Some(name)) {
            diagnostics.push(Diagnostic::error(path, format!("function '{name}' is not a {stage} entry point")));
            diagnostics.push(Diagnostic::note(path, format!("mark '{name}' with the {} attribute to use it as an entry point", stage.attribute())));
        } else {
            diagnostics.push(Diagnostic::error(path, format!("no function named '{name}' in module '{}'", self.name())));
        }
        Diagnosed::failed(diagnostics)
    }
}

/// An entry point validated against a stage
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub(crate) module: Module,
    pub(crate) index: usize,
    pub(crate) stage: Stage,
}

impl EntryPoint {
    /// Function name of the entry point
    pub fn name(&self) -> &str {
        &self.module.inner.ir.entry_points[self.index].name
    }

    /// Stage the entry point was checked for
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Module declaring the entry point
    pub fn module(&self) -> &Module {
        &self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TargetFormat;

    const MARKED: &str = r#"
@vertex
fn main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(f32(index), 0.0, 0.0, 1.0);
}
"#;

    const UNMARKED: &str = r#"
fn main(index: u32) -> vec4<f32> {
    return vec4<f32>(f32(index), 0.0, 0.0, 1.0);
}
"#;

    fn session() -> Session {
        let global = GlobalSession::new();
        let desc = SessionDesc {
            targets: vec![TargetDesc {
                format: TargetFormat::Glsl,
                profile: global.find_profile("glsl_450"),
                minify: false,
            }],
        };
        global.create_session(&desc)
    }

    #[test]
    fn test_find_profile() {
        let global = GlobalSession::new();
        let id = global.find_profile("spirv_1_5");
        assert!(id.is_known());
        assert_eq!(global.profile(id), Some(Profile::SpirV { major: 1, minor: 5 }));
        assert_eq!(global.profile_name(id), Some("spirv_1_5"));

        let unknown = global.find_profile("sm_6_0");
        assert_eq!(unknown, ProfileId::UNKNOWN);
        assert_eq!(global.profile(unknown), None);
    }

    #[test]
    fn test_session_keeps_every_target() {
        let global = GlobalSession::new();
        let desc = SessionDesc {
            targets: vec![
                TargetDesc {
                    format: TargetFormat::Glsl,
                    profile: global.find_profile("glsl_450"),
                    minify: false,
                },
                TargetDesc {
                    format: TargetFormat::SpirV,
                    profile: global.find_profile("spirv_1_5"),
                    minify: false,
                },
            ],
        };
        assert_eq!(global.create_session(&desc).target_count(), 2);
        assert_eq!(session().target_count(), 1);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let result = session().load_module_from_source("broken", "broken.wgsl", "fn main( {");
        assert!(!result.is_ok());
        assert!(result.diagnostics.has_errors());
        assert!(result.diagnostics.text().contains("broken.wgsl"));
    }

    #[test]
    fn test_load_warns_without_entry_points() {
        let result = session().load_module_from_source("plain", "plain.wgsl", UNMARKED);
        assert!(result.is_ok());
        assert!(!result.diagnostics.has_errors());
        assert_eq!(result.diagnostics.text(), "plain.wgsl: warning: module 'plain' declares no entry points");
    }

    #[test]
    fn test_entry_point_lookup() {
        let module = session().load_module_from_source("marked", "marked.wgsl", MARKED).value.unwrap();
        assert_eq!(module.entry_points(), vec![("main".to_string(), Some(Stage::Vertex))]);

        let found = module.find_and_check_entry_point("main", Stage::Vertex);
        assert!(found.diagnostics.is_empty());
        let entry_point = found.value.unwrap();
        assert_eq!(entry_point.name(), "main");
        assert_eq!(entry_point.stage(), Stage::Vertex);
        assert_eq!(entry_point.module().name(), "marked");

        let wrong_stage = module.find_and_check_entry_point("main", Stage::Fragment);
        assert!(!wrong_stage.is_ok());
        assert!(wrong_stage.diagnostics.text().contains("declared for the vertex stage, not the fragment stage"));
    }

    #[test]
    fn test_unmarked_function_is_not_an_entry_point() {
        let module = session().load_module_from_source("plain", "plain.wgsl", UNMARKED).value.unwrap();
        let result = module.find_and_check_entry_point("main", Stage::Vertex);

        assert!(!result.is_ok());
        assert_eq!(
            result.diagnostics.text(),
            "plain.wgsl: error: function 'main' is not a vertex entry point\nplain.wgsl: note: mark 'main' with the @vertex attribute to use it as an entry point"
        );

        let missing = module.find_and_check_entry_point("vs_main", Stage::Vertex);
        assert_eq!(missing.diagnostics.text(), "plain.wgsl: error: no function named 'vs_main' in module 'plain'");
    }
}
