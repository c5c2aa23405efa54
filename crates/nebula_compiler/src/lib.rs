//! nebula_compiler: Compiler orchestration.
//!
//! Drives the pipeline from source files to written assemblies:
//! parse -> bind -> emit -> write. Compiled references are read back from
//! assembly text by the [`ScriptLoader`].

pub mod compiler;
pub mod error;
pub mod loader;

pub use compiler::{collect_files, CompileOptions, CompileResult, Compiler};
pub use error::CompileError;
pub use loader::{ScriptLoadError, ScriptLoader};
