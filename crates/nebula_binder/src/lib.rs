//! nebula_binder: Semantic analysis for Nebula.
//!
//! Turns parsed compilation units into typed, lowered programs:
//! - Symbol model and type system (operators, conversions)
//! - Lexical scopes with shadowing
//! - Cross-program resolution against sibling units and compiled scripts
//! - Loop lowering into labels and gotos
//! - Constant folding and all-paths-return checking

pub mod binder;
pub mod bound;
pub mod control_flow;
pub mod conversion;
pub mod folding;
pub mod lowering;
pub mod operators;
pub mod program;
pub mod references;
pub mod scope;
pub mod script;
pub mod symbols;

pub use binder::{bind, BoundUnits, FatalBindError};
pub use bound::{BoundExpression, BoundStatement, BoundVariableDeclaration, LabelId, VariableRef};
pub use conversion::Conversion;
pub use program::{BoundFunction, BoundNamespace, BoundProgram, ProgramDeclarations};
pub use references::{ProgramReferences, ReferenceError};
pub use scope::Scope;
pub use script::{Script, ScriptBundle, ScriptField, ScriptFunction};
pub use symbols::{
    Attribute, BundleField, BundleSymbol, ConstantValue, Declaration, FunctionSymbol,
    ParameterSymbol, Symbol, TypeSymbol, VariableId, VariableSymbol,
};
