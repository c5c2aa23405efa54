//! Driver failures.
//!
//! Problems in the user's sources are diagnostics in the compile result's
//! report; these errors stop the driver itself.

use crate::loader::ScriptLoadError;
use nebula_binder::FatalBindError;
use nebula_emitter::EmitError;
use nebula_options::ProjectError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no source files to compile")]
    NoSources,

    #[error("emitting requires an output folder")]
    MissingOutputFolder,

    #[error("binary bytecode output is not supported; enable readable bytecode")]
    BinaryOutputUnsupported,

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load reference '{}': {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: ScriptLoadError,
    },

    /// Binding halted on a corrupt reference. The inner report holds every
    /// diagnostic collected before the halt.
    #[error(transparent)]
    Reference(#[from] FatalBindError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Config(#[from] ProjectError),
}
