//! Compiled reference scripts.
//!
//! A script is the declaration surface of a previously compiled program:
//! its namespace, bundle layouts and function signatures, with type names
//! kept as written in the assembly text. Bodies are not retained.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptField {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundle {
    pub name: String,
    /// Fields in layout order.
    pub fields: Vec<ScriptField>,
    /// Number of fields the compiled layout declares.
    pub field_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFunction {
    pub name: String,
    pub return_type: String,
    /// Parameter type names in order.
    pub parameters: Vec<String>,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub namespace: String,
    pub bundles: IndexMap<String, ScriptBundle>,
    pub functions: IndexMap<String, ScriptFunction>,
}

impl Script {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn add_bundle(&mut self, bundle: ScriptBundle) {
        self.bundles.insert(bundle.name.clone(), bundle);
    }

    pub fn add_function(&mut self, function: ScriptFunction) {
        self.functions.insert(function.name.clone(), function);
    }
}
