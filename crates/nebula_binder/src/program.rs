//! Bound programs, one per compilation unit.

use crate::bound::BoundStatement;
use crate::references::ProgramReferences;
use crate::symbols::{BundleSymbol, FunctionSymbol};
use indexmap::IndexMap;
use nebula_core::{SourceText, TextSpan};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundNamespace {
    pub name: String,
    /// `None` when the namespace was taken from the file name.
    pub span: Option<TextSpan>,
}

/// The declarations of one unit. Filled while binding the unit's
/// declarations, then frozen behind an `Rc` and shared with the other units.
#[derive(Debug, Clone, Default)]
pub struct ProgramDeclarations {
    pub namespace: String,
    pub bundles: IndexMap<String, Rc<BundleSymbol>>,
    pub functions: IndexMap<String, Rc<FunctionSymbol>>,
    pub native_functions: IndexMap<String, Rc<FunctionSymbol>>,
}

impl ProgramDeclarations {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// A callable function or native function by name.
    pub fn function(&self, name: &str) -> Option<&Rc<FunctionSymbol>> {
        self.functions
            .get(name)
            .or_else(|| self.native_functions.get(name))
    }
}

#[derive(Debug)]
pub struct BoundFunction {
    pub symbol: Rc<FunctionSymbol>,
    /// Lowered body: a flat statement list with labels and gotos.
    pub body: Vec<BoundStatement>,
}

#[derive(Debug)]
pub struct BoundProgram {
    pub namespace: BoundNamespace,
    pub source: Rc<SourceText>,
    pub declarations: Rc<ProgramDeclarations>,
    pub functions: IndexMap<String, BoundFunction>,
    pub references: ProgramReferences,
}

impl BoundProgram {
    pub fn name(&self) -> &str {
        &self.namespace.name
    }
}
