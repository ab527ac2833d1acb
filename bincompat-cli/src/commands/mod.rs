//! Command implementations for the bincompat CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod check;
pub mod completions;
pub mod diff;
pub mod query;

use std::path::{Path, PathBuf};

use anyhow::Context;
use bincompat_core::scanner::{diff_file_pairs, pair_module_files, ModuleDiff, PairedFiles};
use bincompat_core::JsonModuleLoader;

use crate::config::BincompatConfig;

/// Old/new module files paired and diffed.
pub struct Comparison {
    pub paired: PairedFiles,
    pub modules: Vec<ModuleDiff>,
}

/// Pair, load and diff both sides on the blocking pool.
pub async fn compare(old: &str, new: &str, config: &BincompatConfig) -> anyhow::Result<Comparison> {
    let aggregator = config.aggregator()?;
    let options = config.scan_options();
    let old_root = PathBuf::from(old);
    let new_root = PathBuf::from(new);

    tokio::task::spawn_blocking(move || {
        let paired = pair_module_files(&old_root, &new_root, &options)
            .with_context(|| {
                format!(
                    "Failed to collect modules from {} and {}",
                    old_root.display(),
                    new_root.display()
                )
            })?;
        let modules = diff_file_pairs(&paired.pairs, &JsonModuleLoader::new(), &aggregator)
            .context("Failed to diff modules")?;
        Ok::<_, anyhow::Error>(Comparison { paired, modules })
    })
    .await
    .context("Comparison task panicked")?
}

/// File names for display.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| display_name(p)).collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
