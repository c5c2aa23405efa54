//! Compiler orchestration.
//!
//! Parses every source, binds the units together against the loaded
//! references, emits one assembly per unit and writes the output files.

use crate::error::CompileError;
use crate::loader::ScriptLoader;
use bumpalo::Bump;
use nebula_binder::{bind, Script};
use nebula_core::{SourceText, ASSEMBLY_EXTENSION, SOURCE_EXTENSION};
use nebula_diagnostics::Report;
use nebula_emitter::{Assembly, Emitter, OutputFiles, MODULE_NAME};
use nebula_options::CompilerOptions;
use nebula_syntax::parse_compilation_unit;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Settings for one compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Source files. Directories are searched recursively for `*.nebula`.
    pub sources: Vec<PathBuf>,
    /// Compiled `*.neb` files or directories containing them.
    pub references: Vec<PathBuf>,
    pub emit: bool,
    pub output_folder: Option<PathBuf>,
    pub readable_bytecode: bool,
    pub module_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            references: Vec::new(),
            emit: true,
            output_folder: None,
            readable_bytecode: true,
            module_name: MODULE_NAME.to_string(),
        }
    }
}

impl From<CompilerOptions> for CompileOptions {
    fn from(options: CompilerOptions) -> Self {
        Self {
            emit: options.emit(),
            readable_bytecode: options.readable_bytecode(),
            sources: options.sources,
            references: options.references,
            output_folder: options.out_dir,
            module_name: options.module_name.unwrap_or_else(|| MODULE_NAME.to_string()),
        }
    }
}

/// Outcome of a compilation that ran to completion.
#[derive(Debug, Default)]
pub struct CompileResult {
    /// One assembly per unit when binding succeeded, in source order.
    pub programs: Vec<Assembly>,
    /// Files written, parallel to `programs` when emitting.
    pub outputs: Vec<OutputFiles>,
    pub report: Report,
    /// The first source whose parse failed.
    pub failed_source: Option<String>,
}

impl CompileResult {
    pub fn succeeded(&self) -> bool {
        self.failed_source.is_none() && !self.report.has_errors()
    }
}

pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn validate(&self) -> Result<(), CompileError> {
        if self.options.emit {
            if self.options.output_folder.is_none() {
                return Err(CompileError::MissingOutputFolder);
            }
            if !self.options.readable_bytecode {
                return Err(CompileError::BinaryOutputUnsupported);
            }
        }
        Ok(())
    }

    /// Read sources and references from disk and compile them.
    pub fn compile(&self) -> Result<CompileResult, CompileError> {
        self.validate()?;

        let sources = collect_files(&self.options.sources, SOURCE_EXTENSION)?
            .iter()
            .map(|path| {
                SourceText::from_file(path)
                    .map(Rc::new)
                    .map_err(|source| CompileError::Io { path: path.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let scripts = self.load_references()?;

        self.compile_sources(sources, &scripts)
    }

    fn load_references(&self) -> Result<Vec<Rc<Script>>, CompileError> {
        collect_files(&self.options.references, ASSEMBLY_EXTENSION)?
            .into_iter()
            .map(|path| match ScriptLoader::load_file(&path) {
                Ok(script) => Ok(Rc::new(script)),
                Err(source) => Err(CompileError::Script { path, source }),
            })
            .collect()
    }

    /// Compile in-memory sources against already loaded references.
    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn compile_sources(
        &self,
        sources: Vec<Rc<SourceText>>,
        scripts: &[Rc<Script>],
    ) -> Result<CompileResult, CompileError> {
        self.validate()?;
        if sources.is_empty() {
            return Err(CompileError::NoSources);
        }

        let mut result = CompileResult::default();
        let arena = Bump::new();
        let mut units = Vec::with_capacity(sources.len());
        for source in sources {
            let (unit, report) = parse_compilation_unit(&arena, Rc::clone(&source));
            let failed = report.has_errors();
            result.report.extend(report);
            if failed {
                tracing::debug!(file = source.full_path(), "parse failed");
                result.failed_source = Some(source.full_path().to_string());
                return Ok(result);
            }
            units.push(unit);
        }
        tracing::debug!(units = units.len(), "parsed");

        let bound = bind(&units, scripts)?;
        result.report.extend(bound.report);
        if result.report.has_errors() {
            tracing::debug!(errors = result.report.error_count(), "binding failed");
            return Ok(result);
        }

        let emitter = Emitter::new(self.options.module_name.as_str());
        for program in &bound.programs {
            result.programs.push(emitter.emit(program)?);
        }

        if self.options.emit {
            let folder = self
                .options
                .output_folder
                .as_deref()
                .ok_or(CompileError::MissingOutputFolder)?;
            for assembly in &result.programs {
                result.outputs.push(assembly.write(folder)?);
            }
        }

        tracing::debug!(
            programs = result.programs.len(),
            written = result.outputs.len(),
            warnings = result.report.warning_count(),
            "compiled"
        );
        Ok(result)
    }
}

/// Expand `paths` into files: plain files are kept as given, directories are
/// searched recursively for files with `extension`, in sorted order.
pub fn collect_files(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, CompileError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, extension, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk(dir: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<(), CompileError> {
    let io_error = |source: std::io::Error| CompileError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, extension, files)?;
        } else if path.extension().is_some_and(|e| e == extension) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, text: &str) -> Rc<SourceText> {
        Rc::new(SourceText::new(name, text))
    }

    fn in_memory() -> Compiler {
        Compiler::new(CompileOptions {
            emit: false,
            ..CompileOptions::default()
        })
    }

    #[test]
    fn test_no_sources() {
        assert!(matches!(
            in_memory().compile_sources(vec![], &[]),
            Err(CompileError::NoSources)
        ));
    }

    #[test]
    fn test_emit_requires_output_folder() {
        let compiler = Compiler::new(CompileOptions::default());
        assert!(matches!(
            compiler.compile_sources(vec![source("a.nebula", "")], &[]),
            Err(CompileError::MissingOutputFolder)
        ));
    }

    #[test]
    fn test_binary_output_unsupported() {
        let compiler = Compiler::new(CompileOptions {
            output_folder: Some(PathBuf::from("out")),
            readable_bytecode: false,
            ..CompileOptions::default()
        });
        assert!(matches!(
            compiler.compile_sources(vec![source("a.nebula", "")], &[]),
            Err(CompileError::BinaryOutputUnsupported)
        ));
    }

    #[test]
    fn test_stops_at_first_parse_failure() {
        let result = in_memory()
            .compile_sources(
                vec![
                    source("good.nebula", "func void f() { }"),
                    source("bad.nebula", "func void g( { }"),
                    source("worse.nebula", "func"),
                ],
                &[],
            )
            .unwrap();
        assert!(!result.succeeded());
        assert_eq!(result.failed_source.as_deref(), Some("bad.nebula"));
        assert!(result.programs.is_empty());
    }

    #[test]
    fn test_bind_errors_halt_before_emit() {
        let result = in_memory()
            .compile_sources(vec![source("a.nebula", "func int f() { return g(); }")], &[])
            .unwrap();
        assert!(!result.succeeded());
        assert!(result.failed_source.is_none());
        assert!(result.programs.is_empty());
    }

    #[test]
    fn test_module_name_from_options() {
        let compiler = Compiler::new(CompileOptions {
            emit: false,
            module_name: "game".into(),
            ..CompileOptions::default()
        });
        let result = compiler
            .compile_sources(vec![source("a.nebula", "func void f() { }")], &[])
            .unwrap();
        assert!(result.succeeded());
        assert!(result.programs[0].to_text().unwrap().starts_with("# >> game - Version 1.0.0 <<"));
    }

    #[test]
    fn test_options_from_project() {
        let project = nebula_options::parse_project(r#"{ "sources": ["src"], "outDir": "out" }"#).unwrap();
        let options = CompileOptions::from(project);
        assert!(options.emit);
        assert_eq!(options.output_folder, Some(PathBuf::from("out")));
        assert_eq!(options.module_name, MODULE_NAME);
    }
}
