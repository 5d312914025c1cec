use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use meson_core::typ::TypeSet;
use meson_lsp::project::{AstCache, BUILD_FILE, FileSource, MesonTree};

mod report;

use report::{Finding, Summary};

#[derive(Debug, Parser)]
#[command(
    name = "mesonlsp-check",
    author,
    version,
    about = "Check Meson build files without an editor",
    long_about = None
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the diagnostics of every build file reachable from DIR.
    Check {
        /// Project root, the directory holding the top-level meson.build
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Emit a JSON report instead of one line per diagnostic
        #[arg(long)]
        json: bool,
    },
    /// Print the inferred types of the expression at a 1-based position.
    Types {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "LINE", value_parser = clap::value_parser!(u32).range(1..))]
        line: u32,
        #[arg(value_name = "COLUMN", value_parser = clap::value_parser!(u32).range(1..))]
        column: u32,
    },
}

fn maybe_init_tracing() {
    let Ok(raw) = std::env::var("MESONLSP_LOG") else {
        return;
    };
    if raw.trim().is_empty() {
        return;
    }
    use tracing_subscriber::{EnvFilter, fmt};
    let filter = EnvFilter::try_new(raw.trim()).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_writer(std::io::stderr).with_env_filter(filter).try_init();
}

fn load_tree(root: &Path) -> anyhow::Result<MesonTree> {
    let ns = meson_stdlib::namespace()?;
    MesonTree::new(root, &FileSource::new(), &AstCache::new(), &ns)
}

/// Topmost directory of the unbroken chain of build files above `file`.
fn find_project_root(file: &Path) -> Option<PathBuf> {
    let mut root = file.parent()?.to_path_buf();
    if !root.join(BUILD_FILE).is_file() {
        return None;
    }
    while let Some(parent) = root.parent()
        && parent.join(BUILD_FILE).is_file()
    {
        root = parent.to_path_buf();
    }
    Some(root)
}

fn run_check(dir: &Path, json: bool) -> anyhow::Result<bool> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory '{}'", dir.display()))?;
    let tree = load_tree(&root)?;
    let files = tree.diagnostics();
    let findings: Vec<Finding> = files
        .iter()
        .flat_map(|(file, diagnostics)| diagnostics.iter().map(move |d| Finding::new(file, d)))
        .collect();
    let summary = Summary::new(&root, files.len(), &findings);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for finding in &findings {
            println!("{}", finding.render(&root));
        }
        println!(
            "{} error(s), {} warning(s) in {} file(s)",
            summary.errors, summary.warnings, summary.files
        );
    }
    Ok(summary.errors == 0)
}

fn describe(types: &TypeSet) -> String {
    if types.is_empty() {
        "unknown".to_string()
    } else {
        types.to_string()
    }
}

/// `name: types` for the innermost typed expression at a 0-based position.
fn types_at(tree: &MesonTree, file: &Path, line: u32, column: u32) -> Option<String> {
    let metadata = tree.metadata_for(file)?;
    if let Some(identifier) = metadata.find_identifier_at(line, column) {
        return Some(format!("{}: {}", identifier.name, describe(&identifier.types)));
    }
    let method = metadata.find_method_call_at(line, column);
    let call = metadata.find_function_call_at(line, column);
    if let Some(method) = method.filter(|m| m.name_span.contains(line, column)) {
        return Some(format!("{}(): {}", method.name, describe(&method.types)));
    }
    if let Some(call) = call.filter(|c| c.name_span.contains(line, column)) {
        return Some(format!("{}(): {}", call.name, describe(&call.types)));
    }
    match (method, call) {
        (Some(m), Some(c)) if m.span.len() < c.span.len() => Some(format!("{}(): {}", m.name, describe(&m.types))),
        (_, Some(c)) => Some(format!("{}(): {}", c.name, describe(&c.types))),
        (Some(m), None) => Some(format!("{}(): {}", m.name, describe(&m.types))),
        (None, None) => None,
    }
}

fn run_types(file: &Path, line: u32, column: u32) -> anyhow::Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("Failed to resolve file '{}'", file.display()))?;
    let Some(root) = find_project_root(&file) else {
        bail!("No {} next to '{}'", BUILD_FILE, file.display());
    };
    let tree = load_tree(&root)?;
    if tree.metadata_for(&file).is_none() {
        bail!(
            "'{}' is not part of the project rooted at '{}'",
            file.display(),
            root.display()
        );
    }
    match types_at(&tree, &file, line - 1, column - 1) {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => bail!("No typed expression at {}:{}", line, column),
    }
}

fn main() -> anyhow::Result<()> {
    maybe_init_tracing();

    let CliArgs { command } = CliArgs::parse();
    match command {
        Commands::Check { dir, json } => {
            if !run_check(&dir, json)? {
                std::process::exit(1);
            }
        }
        Commands::Types { file, line, column } => run_types(&file, line, column)?,
    }
    Ok(())
}
