//! nebula_emitter: Instruction emission for Nebula.
//!
//! Turns bound programs into:
//! 1. An instruction stream per function (slot allocation, label resolution)
//! 2. Assembly text (`.neb`)
//! 3. A JSON debug document (`.ndbg`)

pub mod assembly;
pub mod debug;
pub mod definitions;
pub mod emitter;
pub mod error;
pub mod instruction;
pub mod opcode;

pub use assembly::{Assembly, OutputFiles, MODULE_NAME, VERSION};
pub use nebula_core::{ASSEMBLY_EXTENSION, DEBUG_EXTENSION};
pub use debug::{DebugBundle, DebugFile, DebugFunction, DebugVariable};
pub use definitions::{BundleDefinition, MethodDefinition, VariableDefinition, Version};
pub use emitter::Emitter;
pub use error::EmitError;
pub use instruction::{Instruction, Operand};
pub use opcode::{ArgumentKind, Opcode};
