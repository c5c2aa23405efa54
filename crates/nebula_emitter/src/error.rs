//! Emitter failures.
//!
//! None of these can happen for a program that bound without errors, except
//! `Io` when writing the output files.

use crate::opcode::Opcode;
use nebula_binder::LabelId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("'{name}' has no storage slot in function '{function}'")]
    MissingStorage { function: String, name: String },

    #[error("{label} is never placed in function '{function}'")]
    UnresolvedLabel { function: String, label: LabelId },

    #[error("opcode '{opcode}' cannot take operand {operand}")]
    ArgumentMismatch { opcode: Opcode, operand: String },

    #[error("unexpected {node} in function '{function}'")]
    UnexpectedNode { function: String, node: &'static str },

    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
