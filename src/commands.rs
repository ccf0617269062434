//! CLI command implementations

use anyhow::Context as _;
use doxgraph_core::{ResolvedGraph, Severity};
use doxgraph_indexer::{Coordinator, IndexerConfig, ScopeMode, extract_files};
use std::path::{Path, PathBuf};

/// Root directory plus the configuration loaded for it.
pub struct Context {
    pub root: PathBuf,
    pub config: IndexerConfig,
}

impl Context {
    pub fn new(root: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => IndexerConfig::load(&path)?,
            None => IndexerConfig::discover(&root)?,
        };
        Ok(Context { root, config })
    }
}

pub fn build(context: &Context, paths: &[PathBuf], concat: bool, save: bool) -> anyhow::Result<()> {
    let mut config = context.config.clone();
    if concat {
        config.scope_mode = ScopeMode::Concatenated;
    }

    let resolved = run(context, &config, paths)?;
    print_diagnostics(&resolved);
    println!(
        "{} symbols, {} groups, {} diagnostics",
        resolved.symbol_count(),
        resolved.groups().count(),
        resolved.diagnostics().len()
    );

    if save {
        let path = doxgraph_core::save_graph(&resolved, &context.root)?;
        tracing::info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

pub fn check(context: &Context, paths: &[PathBuf], deny_warnings: bool) -> anyhow::Result<()> {
    let resolved = run(context, &context.config, paths)?;
    print_diagnostics(&resolved);

    let errors = resolved
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = resolved.diagnostics().len() - errors;

    if errors > 0 || (deny_warnings && warnings > 0) {
        anyhow::bail!("check failed: {} errors, {} warnings", errors, warnings);
    }
    tracing::info!("Check passed with {} warnings", warnings);
    Ok(())
}

pub fn outline(context: &Context, paths: &[PathBuf], max_children: Option<usize>) -> anyhow::Result<()> {
    let resolved = run(context, &context.config, paths)?;
    let limit = max_children.unwrap_or(context.config.max_children);
    let outlines = doxgraph_core::outline(&resolved, limit);
    print!("{}", doxgraph_core::render_outline(&outlines));
    Ok(())
}

pub fn clear(context: &Context) -> anyhow::Result<()> {
    tracing::info!("Clearing cache for: {}", context.root.display());

    doxgraph_core::clear_cache(&context.root)?;

    tracing::info!("Cache cleared");
    Ok(())
}

fn run(context: &Context, config: &IndexerConfig, paths: &[PathBuf]) -> anyhow::Result<ResolvedGraph> {
    let inputs = if paths.is_empty() {
        vec![context.root.clone()]
    } else {
        paths.to_vec()
    };

    let mut files = Vec::new();
    for input in &inputs {
        collect_files(input, config, &mut files)
            .with_context(|| format!("failed to scan {}", input.display()))?;
    }
    tracing::info!("Reading {} source files", files.len());

    let units = extract_files(&files, config)?;
    Ok(Coordinator::new(config.clone()).run(&units))
}

/// Walk `path` depth-first in name order, collecting accepted source files.
/// Explicitly named files are always taken.
fn collect_files(path: &Path, config: &IndexerConfig, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    if path.is_file() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("cannot read directory {}", path.display()))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                tracing::warn!("Cannot read entry: {}", e);
                None
            }
        })
        .collect();
    entries.sort();

    for entry in entries {
        let hidden = entry
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }
        if entry.is_dir() {
            collect_files(&entry, config, files)?;
        } else if config.accepts(&entry) {
            files.push(entry);
        }
    }
    Ok(())
}

fn print_diagnostics(resolved: &ResolvedGraph) {
    for diagnostic in resolved.diagnostics() {
        println!("{}", diagnostic);
    }
}
