//! Module graph loading.
//!
//! A loader turns a file into a [`ModuleGraph`]. Files that cannot be loaded
//! (empty, native images, managed C++, corrupt) are not fatal to a
//! comparison: [`ModuleLoader::load_graph`] logs them and yields `None`, and
//! the file contributes no types.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::ModuleGraph;

/// Reasons a file yields no module graph.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{0} is empty")]
    Empty(PathBuf),

    #[error("{path} is not a module graph ({reason})")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("{0} is a mixed-mode module and cannot be compared")]
    MixedMode(PathBuf),

    #[error("{path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait ModuleLoader: Sync {
    fn load(&self, path: &Path) -> Result<ModuleGraph, LoadError>;

    /// Like [`load`](Self::load), but an unloadable file is logged and yields `None`.
    fn load_graph(&self, path: &Path) -> Option<ModuleGraph> {
        match self.load(path) {
            Ok(graph) => Some(graph),
            Err(LoadError::Empty(path)) => {
                tracing::info!(path = %path.display(), "Skipping empty file");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load module");
                None
            }
        }
    }
}

/// Module references that mark a managed C++ image.
const MIXED_MODE_REFERENCES: &[&str] = &["Microsoft.VisualC"];

/// Reads JSON module graphs eagerly, parsing the whole file up front.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonModuleLoader;

impl JsonModuleLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory module graph; `path` is only used in errors.
    pub fn parse(&self, path: &Path, bytes: &[u8]) -> Result<ModuleGraph, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        if let Some(reason) = native_image_kind(bytes) {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            });
        }
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
        if first != Some(&b'{') {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "expected a JSON object".to_string(),
            });
        }

        let graph: ModuleGraph =
            serde_json::from_slice(bytes).map_err(|source| LoadError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        if graph
            .references
            .iter()
            .any(|r| MIXED_MODE_REFERENCES.contains(&r.as_str()))
        {
            return Err(LoadError::MixedMode(path.to_path_buf()));
        }

        tracing::debug!(
            path = %path.display(),
            module = %graph.name,
            types = graph.types.len(),
            "Loaded module"
        );
        Ok(graph.normalize())
    }
}

impl ModuleLoader for JsonModuleLoader {
    fn load(&self, path: &Path) -> Result<ModuleGraph, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &bytes)
    }
}

/// PE and ELF images are native binaries, not module graphs.
fn native_image_kind(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"MZ") {
        Some("native PE image")
    } else if bytes.starts_with(b"\x7fELF") {
        Some("native ELF image")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(bytes: &[u8]) -> Result<ModuleGraph, LoadError> {
        JsonModuleLoader::new().parse(Path::new("Lib.json"), bytes)
    }

    #[test]
    fn test_parse_module() {
        let json = br#"{
            "name": "Lib",
            "version": "1.0.0",
            "types": [
                {
                    "namespace": "Lib",
                    "name": "Widget",
                    "visibility": "public",
                    "kind": "class",
                    "base_type": "System.Object",
                    "interfaces": ["System.IDisposable"],
                    "methods": [
                        {
                            "name": "Resize",
                            "access": "public",
                            "return_type": "System.Void",
                            "parameters": [{"name": "size", "parameter_type": "System.Int32"}]
                        }
                    ],
                    "fields": [
                        {"name": "Max", "access": "public", "field_type": "System.Int32", "constant": 10}
                    ]
                }
            ]
        }"#;
        let graph = parse(json).unwrap();
        assert_eq!(graph.name, "Lib");
        let ty = &graph.types[0];
        assert_eq!(ty.full_name(), "Lib.Widget");
        assert_eq!(ty.scope.as_deref(), Some("Lib"));
        assert_eq!(ty.methods[0].parameters[0].parameter_type.full_name(), "System.Int32");
        assert!(ty.fields[0].has_constant());
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse(b""), Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_native_images_are_unsupported() {
        assert!(matches!(
            parse(b"MZ\x90\x00\x03"),
            Err(LoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            parse(b"\x7fELF\x02\x01"),
            Err(LoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            parse(b"not json"),
            Err(LoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_corrupt_graph() {
        assert!(matches!(parse(br#"{"types": 3}"#), Err(LoadError::Corrupt { .. })));
    }

    #[test]
    fn test_mixed_mode() {
        let json = br#"{"name": "Native", "references": ["mscorlib", "Microsoft.VisualC"]}"#;
        assert!(matches!(parse(json), Err(LoadError::MixedMode(_))));
    }

    #[test]
    fn test_load_graph_swallows_errors() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("Empty.json");
        fs::write(&empty, "").unwrap();
        let good = dir.path().join("Good.json");
        fs::write(&good, r#"{"name": "Good"}"#).unwrap();

        let loader = JsonModuleLoader::new();
        assert!(loader.load_graph(&empty).is_none());
        assert!(loader.load_graph(&dir.path().join("Missing.json")).is_none());
        assert_eq!(loader.load_graph(&good).map(|g| g.name), Some("Good".to_string()));
    }
}
