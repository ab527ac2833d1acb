//! Module file discovery and old/new pairing using the `ignore` crate.
//!
//! # Features
//!
//! - Files or directories on either side
//! - Case-insensitive pairing by file name
//! - Extension filtering and skipped suffixes (serializer assemblies)
//! - xxHash3 short-circuit for byte-identical pairs
//! - Parallel per-pair diffing with rayon

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use crate::differ::{diff_modules, AssemblyDiffCollection};
use crate::error::Result;
use crate::loader::ModuleLoader;
use crate::query::QueryAggregator;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Which files under a root count as modules.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Extensions without the dot, compared case-insensitively.
    pub extensions: Vec<String>,
    /// File name suffixes to ignore, compared case-insensitively.
    pub skip_suffixes: Vec<String>,
    pub recursive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string()],
            skip_suffixes: vec![
                ".XmlSerializers.dll".to_string(),
                ".XmlSerializers.json".to_string(),
            ],
            recursive: false,
        }
    }
}

impl ScanOptions {
    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let lower = name.to_lowercase();
        if self
            .skip_suffixes
            .iter()
            .any(|suffix| lower.ends_with(&suffix.to_lowercase()))
        {
            tracing::info!(path = %path.display(), "Ignoring serializer module");
            return false;
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&extension))
    }
}

/// An old and new version of the same module file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilePair {
    pub old: PathBuf,
    pub new: PathBuf,
}

/// Outcome of pairing two file sets.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PairedFiles {
    pub pairs: Vec<FilePair>,
    /// Only in the old set.
    pub removed: Vec<PathBuf>,
    /// Only in the new set.
    pub added: Vec<PathBuf>,
}

/// Module files under `root`, sorted by path. A file root is returned as-is.
pub fn collect_module_files(root: &Path, options: &ScanOptions) -> std::result::Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false) // Build output folders are usually git-ignored
        .max_depth(if options.recursive { None } else { Some(1) })
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if is_file && options.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn pairing_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Pair old and new module files by case-insensitive file name.
pub fn pair_module_files(
    old_root: &Path,
    new_root: &Path,
    options: &ScanOptions,
) -> std::result::Result<PairedFiles, ScanError> {
    let old_files = collect_module_files(old_root, options)?;
    let new_files = collect_module_files(new_root, options)?;

    // Two single files are compared regardless of their names.
    if old_root.is_file() && new_root.is_file() {
        return Ok(PairedFiles {
            pairs: vec![FilePair {
                old: old_root.to_path_buf(),
                new: new_root.to_path_buf(),
            }],
            ..Default::default()
        });
    }

    let mut new_by_name: HashMap<String, &PathBuf> = HashMap::new();
    for path in &new_files {
        if new_by_name.insert(pairing_key(path), path).is_some() {
            tracing::warn!(path = %path.display(), "Duplicate module file name; last one wins");
        }
    }

    let mut paired = PairedFiles::default();
    for old in &old_files {
        match new_by_name.remove(&pairing_key(old)) {
            Some(new) => paired.pairs.push(FilePair {
                old: old.clone(),
                new: new.clone(),
            }),
            None => paired.removed.push(old.clone()),
        }
    }
    paired.added = new_files
        .iter()
        .filter(|p| new_by_name.contains_key(&pairing_key(p)))
        .cloned()
        .collect();

    tracing::debug!(
        pairs = paired.pairs.len(),
        removed = paired.removed.len(),
        added = paired.added.len(),
        "Paired module files"
    );
    Ok(paired)
}

/// Diff of one module file pair.
#[derive(Clone, Debug, Serialize)]
pub struct ModuleDiff {
    pub module: String,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    /// Both files had the same content; nothing was loaded.
    pub identical: bool,
    pub diff: AssemblyDiffCollection,
}

/// Load and diff every pair in parallel, in pair order.
///
/// Pairs where either side yields no graph contribute nothing.
pub fn diff_file_pairs<L: ModuleLoader>(
    pairs: &[FilePair],
    loader: &L,
    aggregator: &QueryAggregator,
) -> Result<Vec<ModuleDiff>> {
    let diffs: Vec<Option<ModuleDiff>> = pairs
        .par_iter()
        .map(|pair| diff_pair(pair, loader, aggregator))
        .collect::<Result<_>>()?;
    Ok(diffs.into_iter().flatten().collect())
}

fn diff_pair<L: ModuleLoader>(
    pair: &FilePair,
    loader: &L,
    aggregator: &QueryAggregator,
) -> Result<Option<ModuleDiff>> {
    if let (Some(a), Some(b)) = (file_hash(&pair.old), file_hash(&pair.new)) {
        if a == b {
            tracing::debug!(path = %pair.old.display(), "Identical module files");
            return Ok(Some(ModuleDiff {
                module: module_name(&pair.old),
                old_path: pair.old.clone(),
                new_path: pair.new.clone(),
                identical: true,
                diff: AssemblyDiffCollection::default(),
            }));
        }
    }

    let (Some(old), Some(new)) = (loader.load_graph(&pair.old), loader.load_graph(&pair.new)) else {
        return Ok(None);
    };
    let diff = diff_modules(&old, &new, aggregator)?;
    Ok(Some(ModuleDiff {
        module: old.name,
        old_path: pair.old.clone(),
        new_path: pair.new.clone(),
        identical: false,
        diff,
    }))
}

/// xxHash3 of non-empty file content.
fn file_hash(path: &Path) -> Option<u64> {
    let content = fs::read(path).ok()?;
    (!content.is_empty()).then(|| xxh3_64(&content))
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::JsonModuleLoader;
    use tempfile::TempDir;

    const EMPTY_MODULE: &str = r#"{"name": "Lib"}"#;
    const MODULE_WITH_TYPE: &str = r#"{"name": "Lib", "types": [
        {"namespace": "Lib", "name": "A", "visibility": "public"}
    ]}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_filters_extensions_and_suffixes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Lib.json", EMPTY_MODULE);
        write(dir.path(), "Lib.XmlSerializers.json", EMPTY_MODULE);
        write(dir.path(), "notes.txt", "hello");
        let files = collect_module_files(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(files, vec![dir.path().join("Lib.json")]);
    }

    #[test]
    fn test_collect_respects_recursion() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write(&dir.path().join("sub"), "Deep.json", EMPTY_MODULE);
        let flat = collect_module_files(dir.path(), &ScanOptions::default()).unwrap();
        assert!(flat.is_empty());
        let options = ScanOptions {
            recursive: true,
            ..Default::default()
        };
        assert_eq!(collect_module_files(dir.path(), &options).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = collect_module_files(&dir.path().join("nope"), &ScanOptions::default());
        assert!(matches!(err, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn test_pair_case_insensitive() {
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        write(old.path(), "Lib.json", EMPTY_MODULE);
        write(old.path(), "Gone.json", EMPTY_MODULE);
        write(new.path(), "LIB.json", EMPTY_MODULE);
        write(new.path(), "Fresh.json", EMPTY_MODULE);

        let paired = pair_module_files(old.path(), new.path(), &ScanOptions::default()).unwrap();
        assert_eq!(paired.pairs.len(), 1);
        assert_eq!(paired.pairs[0].new, new.path().join("LIB.json"));
        assert_eq!(paired.removed, vec![old.path().join("Gone.json")]);
        assert_eq!(paired.added, vec![new.path().join("Fresh.json")]);
    }

    #[test]
    fn test_diff_file_pairs() {
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        write(old.path(), "Same.json", EMPTY_MODULE);
        write(new.path(), "Same.json", EMPTY_MODULE);
        write(old.path(), "Lib.json", MODULE_WITH_TYPE);
        write(new.path(), "Lib.json", EMPTY_MODULE);
        write(old.path(), "Broken.json", "");
        write(new.path(), "Broken.json", MODULE_WITH_TYPE);

        let paired = pair_module_files(old.path(), new.path(), &ScanOptions::default()).unwrap();
        assert_eq!(paired.pairs.len(), 3);
        let diffs = diff_file_pairs(
            &paired.pairs,
            &JsonModuleLoader::new(),
            &QueryAggregator::public_api(),
        )
        .unwrap();

        // Sorted by file name; the unloadable pair is dropped.
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].old_path.file_name().unwrap(), "Lib.json");
        assert_eq!(diffs[0].diff.added_removed_types.removed_count(), 1);
        assert!(diffs[1].identical);
        assert!(diffs[1].diff.is_empty());
    }

    #[test]
    fn test_single_files_pair_regardless_of_name() {
        let dir = TempDir::new().unwrap();
        let a = write(dir.path(), "Lib.v1.json", EMPTY_MODULE);
        let b = write(dir.path(), "Lib.v2.json", EMPTY_MODULE);
        let paired = pair_module_files(&a, &b, &ScanOptions::default()).unwrap();
        assert_eq!(paired.pairs, vec![FilePair { old: a, new: b }]);
    }
}
