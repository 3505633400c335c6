//! `pyts`: translate Python files to TypeScript.

mod config;

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use config::PytsConfig;
use pyts_runtime::Primitive;
use pyts_transpile::{Diagnostic, TranslateOptions, TranslationResult};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pyts", version, about = "Translate Python source to TypeScript")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). PYTS_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate files or directories of `.py` files.
    Translate(TranslateArgs),
    /// List the names the runtime module must export.
    Primitives {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct TranslateArgs {
    /// Python files or directories.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory for the `.ts` files. Without it a single file goes to
    /// stdout and several are written next to their sources.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Print a JSON report instead of TypeScript.
    #[arg(long)]
    json: bool,

    /// Project root for `.pyts/config.toml`.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[arg(long)]
    indent: Option<usize>,

    #[arg(long)]
    runtime_module: Option<String>,

    #[arg(long)]
    lazy_comprehensions: bool,

    /// Evaluate chained comparison operands in place instead of through
    /// temporaries.
    #[arg(long)]
    no_hoist_chains: bool,

    /// Report every passthrough fallback.
    #[arg(long)]
    diagnostics: bool,
}

impl TranslateArgs {
    fn options(&self) -> anyhow::Result<TranslateOptions> {
        let mut options = TranslateOptions::default();
        PytsConfig::load(&self.root)?.translate.apply(&mut options);
        if let Some(width) = self.indent {
            options.indent_width = width;
        }
        if let Some(module) = &self.runtime_module {
            options.runtime_module = module.clone();
        }
        if self.lazy_comprehensions {
            options.lazy_comprehensions = true;
        }
        if self.no_hoist_chains {
            options.hoist_chain_operands = false;
        }
        if self.diagnostics {
            options.diagnostics = true;
        }
        Ok(options)
    }
}

/// One entry of the `--json` report.
#[derive(Serialize)]
struct FileReport<'r> {
    path: String,
    required: &'r [String],
    hoisted_imports: &'r [String],
    diagnostics: &'r [Diagnostic],
    text: &'r str,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let outcome = match cli.command {
        Command::Translate(args) => run_translate(&args),
        Command::Primitives { json } => run_primitives(json),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("PYTS_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand directories to the `.py` files below them, sorted.
fn collect_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in walkdir::WalkDir::new(path) {
                let entry = entry.with_context(|| format!("walking {}", path.display()))?;
                let is_python = entry.path().extension().is_some_and(|ext| ext == "py");
                if entry.file_type().is_file() && is_python {
                    let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
                    found.push((entry.path().to_path_buf(), relative.to_path_buf()));
                }
            }
            found.sort();
            inputs.extend(found);
        } else if path.is_file() {
            let name = path.file_name().map(PathBuf::from).unwrap_or_else(|| path.clone());
            inputs.push((path.clone(), name));
        } else {
            bail!("no such file or directory: {}", path.display());
        }
    }
    Ok(inputs)
}

fn translate_file(path: &Path, options: &TranslateOptions) -> anyhow::Result<TranslationResult> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let result = pyts_transpile::translate_with(&source, options)
        .with_context(|| format!("translating {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        required = result.required.len(),
        "translated"
    );
    Ok(result)
}

fn run_translate(args: &TranslateArgs) -> anyhow::Result<()> {
    let options = args.options()?;
    let inputs = collect_inputs(&args.files)?;
    if inputs.is_empty() {
        bail!("no Python files found");
    }

    let results: Vec<(&(PathBuf, PathBuf), anyhow::Result<TranslationResult>)> = inputs
        .par_iter()
        .map(|input| (input, translate_file(&input.0, &options)))
        .collect();

    let mut translated = Vec::with_capacity(results.len());
    for ((path, relative), result) in results {
        let result = result?;
        for diagnostic in &result.diagnostics {
            tracing::warn!("{}:{diagnostic}", path.display());
        }
        translated.push((path, relative, result));
    }

    if args.json {
        let report: Vec<FileReport> = translated
            .iter()
            .map(|(path, _, result)| FileReport {
                path: path.display().to_string(),
                required: &result.required,
                hoisted_imports: &result.hoisted_imports,
                diagnostics: &result.diagnostics,
                text: &result.text,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match (&args.out_dir, translated.as_slice()) {
        (None, [(_, _, result)]) => print!("{}", result.text),
        (out_dir, _) => {
            for (path, relative, result) in &translated {
                let target = match out_dir {
                    Some(dir) => dir.join(relative).with_extension("ts"),
                    None => path.with_extension("ts"),
                };
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                std::fs::write(&target, &result.text)
                    .with_context(|| format!("writing {}", target.display()))?;
                tracing::info!(path = %target.display(), "wrote");
            }
        }
    }
    Ok(())
}

fn run_primitives(json: bool) -> anyhow::Result<()> {
    let mut primitives: Vec<Primitive> = Primitive::ALL.to_vec();
    primitives.sort();
    if json {
        let names: Vec<&str> = primitives.iter().map(|p| p.name()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }
    for primitive in primitives {
        let kind = if primitive.is_exception() { "class" } else { "function" };
        println!("{kind}\t{primitive}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg").join("b.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("a.py"), "y = 2\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let inputs = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let relative: Vec<PathBuf> = inputs.into_iter().map(|(_, rel)| rel).collect();
        assert_eq!(relative, vec![PathBuf::from("a.py"), PathBuf::from("pkg/b.py")]);
    }

    #[test]
    fn test_collect_inputs_rejects_missing_path() {
        let dir = TempDir::new().unwrap();
        assert!(collect_inputs(&[dir.path().join("missing.py")]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".pyts")).unwrap();
        std::fs::write(
            dir.path().join(".pyts").join("config.toml"),
            "[translate]\nindent_width = 8\nlazy_comprehensions = true\n",
        )
        .unwrap();
        let cli = Cli::parse_from([
            "pyts",
            "translate",
            "x.py",
            "--root",
            dir.path().to_str().unwrap(),
            "--indent",
            "4",
        ]);
        let Command::Translate(args) = cli.command else {
            panic!("expected translate");
        };
        let options = args.options().unwrap();
        assert_eq!(options.indent_width, 4);
        assert!(options.lazy_comprehensions);
    }
}
