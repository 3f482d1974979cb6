//! Entry-point reproduction CLI
//!
//! With no arguments, compiles the built-in pair of shaders: `error.wgsl`, whose
//! `main` lacks the `@vertex` attribute, then `ok.wgsl`, which has it. Each
//! stage's diagnostics are printed as they are produced, followed by the
//! generated GLSL for shaders that compile.
//!
//! # Usage
//! ```bash
//! entry-point-repro
//! entry-point-repro --format spirv --profile spirv_1_3 shader.wgsl
//! entry-point-repro --manifest repro.yaml --json
//! ```

use clap::Parser;
use entry_point_repro::{
    AppError, Reporter,
    manifest::{self, Overrides},
};
use shader_session::{Stage, TargetFormat};
use std::{path::PathBuf, process::ExitCode};

/// Command-line arguments of the reproduction driver
#[derive(Parser)]
#[command(version, about = "Compiles WGSL shaders and reports entry-point lookup failures")]
struct Args {
    /// Shader files to compile instead of the built-in pair
    files: Vec<PathBuf>,

    /// YAML manifest listing shaders and the compilation target
    #[arg(long, short)]
    manifest: Option<PathBuf>,

    /// Target format (glsl, wgsl, spirv)
    #[arg(long, short)]
    format: Option<TargetFormat>,

    /// Target profile name (e.g. spirv_1_5, glsl_450)
    #[arg(long, short)]
    profile: Option<String>,

    /// Entry point function name
    #[arg(long, short)]
    entry_point: Option<String>,

    /// Stage the entry point must be marked for (vertex, fragment, compute)
    #[arg(long, short)]
    stage: Option<Stage>,

    /// Minify WGSL output
    #[arg(long)]
    minify: bool,

    /// Print a JSON summary of all outcomes after the report
    #[arg(long)]
    json: bool,

    /// Exit with status 0 even if a shader fails to compile
    #[arg(long)]
    always_exit_zero: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, AppError> {
    // Logs go to stderr; stdout carries the report
    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Manifest first, then command-line overrides
    let overrides = Overrides {
        format: args.format,
        profile: args.profile,
        entry_point: args.entry_point,
        stage: args.stage,
        minify: args.minify,
        files: args.files,
    };
    let (options, sources) = manifest::resolve(args.manifest.as_deref(), &overrides)?;

    tracing::info!(shaders = sources.len(), format = %options.format, profile = options.profile.as_str(), "starting compilation");

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    let summary = entry_point_repro::run(&sources, &options, &mut reporter);
    let mut out = reporter.finish()?;

    if args.json {
        use std::io::Write;
        writeln!(out, "{}", summary.to_json()?)?;
    }

    let status = summary.exit_status(args.always_exit_zero);
    if !summary.all_succeeded() {
        tracing::warn!(failed = summary.failure_count(), status, "some shaders failed to compile");
    }
    Ok(ExitCode::from(status))
}
