//! Emitted definitions: methods, bundles and their typed slots.

use crate::instruction::Instruction;
use nebula_binder::{Attribute, BundleSymbol, TypeSymbol};
use nebula_core::TextSpan;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A typed, indexed slot: a local, a parameter or a bundle field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    pub ty: TypeSymbol,
    pub index: u32,
}

impl VariableDefinition {
    pub fn new(name: impl Into<String>, ty: TypeSymbol, index: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            index,
        }
    }

    /// Namespace and name of the declared bundle behind a bundle-typed slot.
    pub fn source_type(&self) -> Option<(&str, &str)> {
        let ty = match &self.ty {
            TypeSymbol::Array { value, .. } => value.as_ref(),
            ty => ty,
        };
        match ty {
            TypeSymbol::NamedBundle { namespace, alias } => Some((namespace.as_str(), alias.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BundleDefinition {
    pub name: String,
    pub fields: Vec<VariableDefinition>,
}

impl BundleDefinition {
    pub fn from_symbol(bundle: &BundleSymbol) -> Self {
        Self {
            name: bundle.name.clone(),
            fields: bundle
                .fields
                .iter()
                .map(|f| VariableDefinition::new(f.name.as_str(), f.ty.clone(), f.ordinal))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDefinition {
    pub name: String,
    pub return_type: TypeSymbol,
    pub attributes: Vec<Attribute>,
    pub parameters: Vec<VariableDefinition>,
    /// Locals in slot order.
    pub locals: Vec<VariableDefinition>,
    pub instructions: Vec<Instruction>,
    /// Span of the whole declaration.
    pub span: Option<TextSpan>,
}
