//! nebula_options: `nebula.json` project files and compiler options.
//!
//! A project file lists the sources to compile, the compiled references to
//! link against and where to put the output. Command line flags override
//! whatever the project file sets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default project file name.
pub const PROJECT_FILE_NAME: &str = "nebula.json";

/// Compiler options, matching the `nebula.json` schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Source files or directories searched for `*.nebula` files.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Compiled `*.neb` files or directories containing them.
    #[serde(default)]
    pub references: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub emit: Option<bool>,
    pub readable_bytecode: Option<bool>,
    pub module_name: Option<String>,
}

impl CompilerOptions {
    /// Whether output files are written. Defaults to `true`.
    pub fn emit(&self) -> bool {
        self.emit.unwrap_or(true)
    }

    pub fn readable_bytecode(&self) -> bool {
        self.readable_bytecode.unwrap_or(true)
    }

    /// Make relative paths relative to `base` instead of the working
    /// directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        self.sources.iter_mut().for_each(resolve);
        self.references.iter_mut().for_each(resolve);
        if let Some(out_dir) = self.out_dir.as_mut() {
            resolve(out_dir);
        }
    }

    /// Overlay `other` on top of `self`: set values and non-empty lists in
    /// `other` win.
    pub fn merge(mut self, other: CompilerOptions) -> CompilerOptions {
        if !other.sources.is_empty() {
            self.sources = other.sources;
        }
        if !other.references.is_empty() {
            self.references = other.references;
        }
        self.out_dir = other.out_dir.or(self.out_dir);
        self.emit = other.emit.or(self.emit);
        self.readable_bytecode = other.readable_bytecode.or(self.readable_bytecode);
        self.module_name = other.module_name.or(self.module_name);
        self
    }
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project file '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a project file from a string.
pub fn parse_project(content: &str) -> Result<CompilerOptions, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a project file from a path. Relative paths inside the file are
/// resolved against the file's directory.
pub fn parse_project_file(path: &Path) -> Result<CompilerOptions, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut options = parse_project(&content).map_err(|source| ProjectError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(base) = path.parent() {
        options.resolve_paths(base);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project() {
        let options = parse_project(
            r#"{
                "sources": ["src"],
                "references": ["lib/core.neb"],
                "outDir": "out",
                "readableBytecode": true,
                "moduleName": "game"
            }"#,
        )
        .unwrap();
        assert_eq!(options.sources, vec![PathBuf::from("src")]);
        assert_eq!(options.out_dir, Some(PathBuf::from("out")));
        assert_eq!(options.module_name.as_deref(), Some("game"));
        assert!(options.emit());
    }

    #[test]
    fn test_empty_project_uses_defaults() {
        let options = parse_project("{}").unwrap();
        assert!(options.sources.is_empty());
        assert!(options.emit());
        assert!(options.readable_bytecode());
    }

    #[test]
    fn test_unknown_shape_is_an_error() {
        assert!(parse_project(r#"{ "sources": "src" }"#).is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let mut options = CompilerOptions {
            sources: vec![PathBuf::from("src")],
            out_dir: Some(PathBuf::from("out")),
            ..CompilerOptions::default()
        };
        options.resolve_paths(Path::new("/projects/game"));
        assert_eq!(options.sources, vec![PathBuf::from("/projects/game/src")]);
        assert_eq!(options.out_dir, Some(PathBuf::from("/projects/game/out")));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let project = CompilerOptions {
            sources: vec![PathBuf::from("src")],
            out_dir: Some(PathBuf::from("out")),
            emit: Some(true),
            ..CompilerOptions::default()
        };
        let flags = CompilerOptions {
            emit: Some(false),
            ..CompilerOptions::default()
        };
        let merged = project.merge(flags);
        assert_eq!(merged.sources, vec![PathBuf::from("src")]);
        assert_eq!(merged.out_dir, Some(PathBuf::from("out")));
        assert!(!merged.emit());
    }

    #[test]
    fn test_parse_project_file() {
        let dir = std::env::temp_dir().join(format!("nebula_options_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(PROJECT_FILE_NAME);
        std::fs::write(&path, r#"{ "sources": ["main.nebula"] }"#).unwrap();

        let options = parse_project_file(&path).unwrap();
        assert_eq!(options.sources, vec![dir.join("main.nebula")]);
        assert!(matches!(
            parse_project_file(&dir.join("missing.json")),
            Err(ProjectError::Io { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
