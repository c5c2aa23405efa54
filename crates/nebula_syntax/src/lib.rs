//! nebula_syntax: Scanner, syntax tree and parser for Nebula source files.
//!
//! Parsing never fails outright. Problems are collected into a
//! [`Report`](nebula_diagnostics::Report) and the tree is completed with
//! synthesized tokens.

pub mod ast;
pub mod parser;
pub mod scanner;
pub mod token;

pub use ast::CompilationUnit;
pub use parser::{parse_compilation_unit, Parser};
pub use scanner::Scanner;
pub use token::{SyntaxKind, Token, TokenValue};
