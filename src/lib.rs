pub mod block;
pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod names;
pub mod precedence;
pub mod registry;
pub mod rules;
pub mod workspace;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

pub use block::{Block, BlockGraph, BlockId, FieldValue, VariableModel};
pub use config::{Dialect, GeneratorOptions};
pub use error::{GenerateError, GenerateResult};
pub use generator::{GenerationContext, Generator, Walker};
pub use names::{NameCategory, NameTable};
pub use precedence::Precedence;
pub use registry::{Emission, EmissionRule, Registry};

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let total_stages = 3 + usize::from(args.output.is_some() && !args.check);
    let progress = CliProgress::new(if args.check { "Check" } else { "Generate" }, total_stages);
    let mut stage = 0usize;

    stage += 1;
    progress.emit(stage, "Resolving input path");
    let input = canonicalize_file(&args.input)?;

    stage += 1;
    progress.emit(stage, "Loading workspace");
    let graph = workspace::load_workspace_file(&input)?;

    stage += 1;
    progress.emit(stage, "Generating code");
    let generator = Generator::rust().with_options(args.generator_options());
    let code = generator
        .generate(&graph)
        .map_err(|e| anyhow::anyhow!("Generation failed for '{}': {}", pretty_path(&input), e))?;

    if args.check {
        return Ok(());
    }

    match &args.output {
        Some(output) => {
            stage += 1;
            progress.emit(stage, "Writing output");
            std::fs::write(output, code.as_bytes())?;
        }
        None => print!("{}", code),
    }
    Ok(())
}

/// Loads a JSON workspace and generates Rust with the built-in rules.
pub fn generate_from_json(source: &str, options: GeneratorOptions) -> Result<String> {
    let graph = workspace::load_workspace_json(source)?;
    Ok(Generator::rust().with_options(options).generate(&graph)?)
}

/// Loads an XML workspace and generates Rust with the built-in rules.
pub fn generate_from_xml(source: &str, options: GeneratorOptions) -> Result<String> {
    let graph = workspace::load_workspace_xml(source)?;
    Ok(Generator::rust().with_options(options).generate(&graph)?)
}

pub fn generate_file(input: &Path, options: GeneratorOptions) -> Result<String> {
    let input = canonicalize_file(input)?;
    let graph = workspace::load_workspace_file(&input)?;
    Ok(Generator::rust().with_options(options).generate(&graph)?)
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

fn pretty_path(path: &Path) -> String {
    let raw = path.display().to_string();
    if let Some(stripped) = raw.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        raw
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        log::info!("{}: {} ({}/{})", self.prefix, label, step, self.total);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
