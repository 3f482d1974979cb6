//! Compilation profiles, target formats and shader stages
//!
//! This module defines the vocabulary a session is configured with: which code
//! format each target emits, which named profile constrains it, and which
//! pipeline stage an entry point belongs to.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Named profiles known to every global session, in registry order.
///
/// A profile id is the 1-based position of the entry in this table; id 0 is
/// reserved for unknown profiles.
pub const PREDEFINED_PROFILES: &[(&str, Profile)] = &[
    // SPIR-V language versions
    ("spirv_1_0", Profile::SpirV { major: 1, minor: 0 }),
    ("spirv_1_1", Profile::SpirV { major: 1, minor: 1 }),
    ("spirv_1_2", Profile::SpirV { major: 1, minor: 2 }),
    ("spirv_1_3", Profile::SpirV { major: 1, minor: 3 }),
    ("spirv_1_4", Profile::SpirV { major: 1, minor: 4 }),
    ("spirv_1_5", Profile::SpirV { major: 1, minor: 5 }),
    ("spirv_1_6", Profile::SpirV { major: 1, minor: 6 }),
    // Desktop GLSL versions
    ("glsl_330", Profile::Glsl(330)),
    ("glsl_450", Profile::Glsl(450)),
    // GLSL ES versions
    ("glsl_es_300", Profile::GlslEs(300)),
    ("glsl_es_310", Profile::GlslEs(310)),
    // WGSL has a single profile
    ("wgsl", Profile::Wgsl),
];

/// A capability/version descriptor constraining code generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// SPIR-V language version
    SpirV { major: u8, minor: u8 },
    /// Desktop GLSL version (e.g. 450)
    Glsl(u16),
    /// GLSL ES version (e.g. 310)
    GlslEs(u16),
    /// WGSL
    Wgsl,
}

/// Opaque identifier of a profile resolved by [`crate::GlobalSession::find_profile`]
///
/// Unrecognized names resolve to [`ProfileId::UNKNOWN`] instead of failing; the
/// problem surfaces when a program using the target is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileId(pub(crate) u32);

impl ProfileId {
    /// The id returned for names missing from the registry
    pub const UNKNOWN: ProfileId = ProfileId(0);

    /// Returns true if this id refers to a registered profile
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

/// Output format of a compilation target
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// GLSL source text
    #[default]
    Glsl,
    /// WGSL source text
    Wgsl,
    /// SPIR-V binary, little-endian words
    SpirV,
}

impl TargetFormat {
    /// Returns true if code in this format is human-readable text
    pub fn is_textual(&self) -> bool {
        match self {
            TargetFormat::Glsl | TargetFormat::Wgsl => true,
            TargetFormat::SpirV => false,
        }
    }

    /// Returns the lowercase name used on the command line and in manifests
    pub fn name(&self) -> &'static str {
        match self {
            TargetFormat::Glsl => "glsl",
            TargetFormat::Wgsl => "wgsl",
            TargetFormat::SpirV => "spirv",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetFormat {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "glsl" => Ok(TargetFormat::Glsl),
            "wgsl" => Ok(TargetFormat::Wgsl),
            "spirv" | "spir-v" => Ok(TargetFormat::SpirV),
            _ => Err(UnknownNameError {
                kind: "target format",
                name: s.to_string(),
                expected: "glsl, wgsl, spirv",
            }),
        }
    }
}

/// Pipeline stage an entry point is marked for
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Vertex stage, marked with `@vertex`
    #[default]
    Vertex,
    /// Fragment stage, marked with `@fragment`
    Fragment,
    /// Compute stage, marked with `@compute`
    Compute,
}

impl Stage {
    /// All stages in declaration order
    pub const ALL: [Stage; 3] = [Stage::Vertex, Stage::Fragment, Stage::Compute];

    /// Returns the lowercase stage name
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        }
    }

    /// Returns the WGSL attribute that marks a function as an entry point for this stage
    pub fn attribute(&self) -> &'static str {
        match self {
            Stage::Vertex => "@vertex",
            Stage::Fragment => "@fragment",
            Stage::Compute => "@compute",
        }
    }

    pub(crate) fn from_naga(stage: naga::ShaderStage) -> Option<Stage> {
        Self::ALL.into_iter().find(|candidate| naga::ShaderStage::from(*candidate) == stage)
    }
}

impl From<Stage> for naga::ShaderStage {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
            Stage::Compute => naga::ShaderStage::Compute,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertex" => Ok(Stage::Vertex),
            "fragment" => Ok(Stage::Fragment),
            "compute" => Ok(Stage::Compute),
            _ => Err(UnknownNameError {
                kind: "stage",
                name: s.to_string(),
                expected: "vertex, fragment, compute",
            }),
        }
    }
}

/// Error returned when parsing a format or stage name fails
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} '{name}' (expected one of: {expected})")]
pub struct UnknownNameError {
    kind: &'static str,
    name: String,
    expected: &'static str,
}

/// A single compilation target of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDesc {
    /// Output format
    pub format: TargetFormat,
    /// Profile resolved through the global session
    pub profile: ProfileId,
    /// Minify generated code (WGSL only)
    pub minify: bool,
}

/// Configuration of a compilation session
#[derive(Debug, Clone, Default)]
pub struct SessionDesc {
    /// Targets code is generated for, addressed by index
    pub targets: Vec<TargetDesc>,
}
