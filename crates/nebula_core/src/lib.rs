//! nebula_core: Core utilities for the Nebula compiler.
//!
//! Provides text spans, line maps and the source text container used
//! throughout the compiler pipeline.

pub mod source;
pub mod text;

// Re-export commonly used types
pub use source::SourceText;
pub use text::{LineAndColumn, LineMap, TextSpan};

/// Extension of Nebula source files.
pub const SOURCE_EXTENSION: &str = "nebula";

/// Extension of compiled assembly files.
pub const ASSEMBLY_EXTENSION: &str = "neb";

/// Extension of debug documents.
pub const DEBUG_EXTENSION: &str = "ndbg";
