//! Shader sources compiled by the reproduction
//!
//! The two built-in sources differ only in the `@vertex` attribute on `main`.
//! Without it, `main` is an ordinary function and entry-point lookup fails.

use std::path::Path;

/// Full-screen triangle vertex shader whose `main` lacks the stage attribute
pub const SHADER_SOURCE_ERROR: &str = r#"struct Input {
    @builtin(vertex_index) vertex_id: u32,
};

struct Output {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

fn main(input: Input) -> Output {
    var position_uvs = array<vec4<f32>, 3>(
        vec4<f32>(-1.0, -1.0, 0.0, 0.0),
        vec4<f32>(3.0, -1.0, 2.0, 0.0),
        vec4<f32>(-1.0, 3.0, 0.0, 2.0),
    );

    var output: Output;
    output.position = vec4<f32>(position_uvs[input.vertex_id].xy, 0.0, 1.0);
    output.uv = position_uvs[input.vertex_id].zw;
    return output;
}
"#;

/// The same shader with `main` marked as a vertex entry point
pub const SHADER_SOURCE_OK: &str = r#"struct Input {
    @builtin(vertex_index) vertex_id: u32,
};

struct Output {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn main(input: Input) -> Output {
    var position_uvs = array<vec4<f32>, 3>(
        vec4<f32>(-1.0, -1.0, 0.0, 0.0),
        vec4<f32>(3.0, -1.0, 2.0, 0.0),
        vec4<f32>(-1.0, 3.0, 0.0, 2.0),
    );

    var output: Output;
    output.position = vec4<f32>(position_uvs[input.vertex_id].xy, 0.0, 1.0);
    output.uv = position_uvs[input.vertex_id].zw;
    return output;
}
"#;

/// A named piece of shader source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Human-readable name, also used as the module file name
    pub name: String,
    /// WGSL source text
    pub text: String,
}

impl ShaderSource {
    /// Creates a source from a name and text
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Reads a source file, naming it after the file name
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path.file_name().map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self { name, text })
    }
}

/// Returns the reproduction pair: the failing source first, then the working one
pub fn builtin_sources() -> Vec<ShaderSource> {
    vec![ShaderSource::new("error.wgsl", SHADER_SOURCE_ERROR), ShaderSource::new("ok.wgsl", SHADER_SOURCE_OK)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources_differ_only_in_stage_attribute() {
        let sources = builtin_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "error.wgsl");
        assert_eq!(sources[1].name, "ok.wgsl");

        assert!(!sources[0].text.contains("@vertex"));
        assert_eq!(sources[1].text.replace("@vertex\n", ""), sources[0].text);
    }

    #[test]
    fn test_from_file_uses_file_name() {
        let dir = std::env::temp_dir().join(format!("entry-point-repro-sources-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("triangle.wgsl");
        std::fs::write(&path, SHADER_SOURCE_OK).unwrap();

        let source = ShaderSource::from_file(&path).unwrap();
        assert_eq!(source.name, "triangle.wgsl");
        assert_eq!(source.text, SHADER_SOURCE_OK);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
