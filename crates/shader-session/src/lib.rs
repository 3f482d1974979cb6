//! Session-based shader compilation on top of naga
//!
//! This crate exposes a small handle-oriented compiler API: a global session
//! resolves profiles and creates sessions, a session loads WGSL modules, modules
//! yield stage-checked entry points, and components are composed, linked and
//! turned into target code. Every call returns its own diagnostics alongside an
//! optional result handle.
//!
//! ```no_run
//! use shader_session::{GlobalSession, SessionDesc, Stage, TargetDesc, TargetFormat};
//!
//! let global = GlobalSession::new();
//! let session = global.create_session(&SessionDesc {
//!     targets: vec![TargetDesc { format: TargetFormat::Glsl, profile: global.find_profile("glsl_450"), minify: false }],
//! });
//! let module = session.load_module_from_source("shader", "shader.wgsl", "@vertex fn main() -> @builtin(position) vec4<f32> { return vec4<f32>(); }");
//! let module = module.value.unwrap();
//! let entry_point = module.find_and_check_entry_point("main", Stage::Vertex).value.unwrap();
//! let program = session.create_composite_component(&[module.into(), entry_point.into()]).value.unwrap();
//! let linked = program.link().value.unwrap();
//! let code = linked.entry_point_code(0, 0).value.unwrap();
//! println!("{}", code.as_text().unwrap());
//! ```

mod codegen;
mod component;
mod diagnostics;
mod profile;
mod session;

pub use codegen::CodeBlob;
pub use component::{Component, Composite, LinkedEntryPoint, LinkedProgram};
pub use diagnostics::{Diagnosed, Diagnostic, Diagnostics, Severity};
pub use profile::{PREDEFINED_PROFILES, Profile, ProfileId, SessionDesc, Stage, TargetDesc, TargetFormat, UnknownNameError};
pub use session::{EntryPoint, GlobalSession, Module, Session};

/// Validates a module with every check and capability enabled
pub(crate) fn validate(module: &naga::Module) -> Result<naga::valid::ModuleInfo, naga::WithSpan<naga::valid::ValidationError>> {
    let mut validator = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all());
    validator.validate(module)
}
