//! The debug document written next to each assembly.
//!
//! Built from the emitted assembly only. Line numbers are zero-based; `-1`
//! marks a function without a source declaration. Fields holding their
//! default value are left out of the JSON.

use crate::assembly::Assembly;
use crate::definitions::{MethodDefinition, VariableDefinition};
use indexmap::{IndexMap, IndexSet};
use md5::{Digest, Md5};
use nebula_core::SourceText;
use serde::{Deserialize, Serialize};

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DebugFile {
    #[serde(skip_serializing_if = "is_default")]
    pub namespace: String,
    #[serde(skip_serializing_if = "is_default")]
    pub original_file_name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub original_file_full_name: String,
    #[serde(rename = "MD5Hash", skip_serializing_if = "is_default")]
    pub md5_hash: String,
    #[serde(skip_serializing_if = "is_default")]
    pub bundles: IndexMap<String, DebugBundle>,
    #[serde(skip_serializing_if = "is_default")]
    pub functions: IndexMap<String, DebugFunction>,
    #[serde(skip_serializing_if = "is_default")]
    pub native_functions: IndexSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DebugBundle {
    #[serde(skip_serializing_if = "is_default")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub fields: Vec<DebugVariable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DebugVariable {
    #[serde(skip_serializing_if = "is_default")]
    pub name: String,
    /// Namespace of the declared bundle, for bundle-typed entries.
    #[serde(skip_serializing_if = "is_default")]
    pub source_namespace: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DebugFunction {
    #[serde(skip_serializing_if = "is_default")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub line_number: i32,
    #[serde(skip_serializing_if = "is_default")]
    pub end_line_number: i32,
    #[serde(skip_serializing_if = "is_default")]
    pub instruction_count: usize,
    #[serde(skip_serializing_if = "is_default")]
    pub parameters: Vec<DebugVariable>,
    #[serde(skip_serializing_if = "is_default")]
    pub local_variables: Vec<DebugVariable>,
    /// Source line to the first instruction emitted for it.
    #[serde(skip_serializing_if = "is_default")]
    pub line_starting_opcode_index: IndexMap<u32, usize>,
    /// Indices where a new statement's instructions begin.
    #[serde(skip_serializing_if = "is_default")]
    pub statements: Vec<usize>,
}

impl DebugVariable {
    fn from_definition(definition: &VariableDefinition) -> Self {
        let source = definition.source_type();
        Self {
            name: definition.name.clone(),
            source_namespace: source.map(|(namespace, _)| namespace.to_string()),
            source_type: source.map(|(_, name)| name.to_string()),
        }
    }
}

impl DebugFunction {
    fn from_method(method: &MethodDefinition, source: &SourceText) -> Self {
        let (line_number, end_line_number) = match method.span {
            Some(span) => (source.line_of(span.start) as i32, source.line_of(span.end()) as i32),
            None => (-1, -1),
        };

        let mut line_starting_opcode_index = IndexMap::new();
        let mut statements = Vec::new();
        let mut last_line = None;
        let mut last_span = None;
        for (index, instruction) in method.instructions.iter().enumerate() {
            if let Some(span) = instruction.span {
                let line = source.line_of(span.start);
                if last_line != Some(line) {
                    line_starting_opcode_index.entry(line).or_insert(index);
                    last_line = Some(line);
                }
            }
            if instruction.span != last_span {
                statements.push(index);
                last_span = instruction.span;
            }
        }

        Self {
            name: method.name.clone(),
            line_number,
            end_line_number,
            instruction_count: method.instructions.len(),
            parameters: method.parameters.iter().map(DebugVariable::from_definition).collect(),
            local_variables: method.locals.iter().map(DebugVariable::from_definition).collect(),
            line_starting_opcode_index,
            statements,
        }
    }
}

impl DebugFile {
    pub fn from_assembly(assembly: &Assembly) -> Self {
        let source = &assembly.source;
        let bundles = assembly
            .bundles
            .iter()
            .map(|bundle| {
                let debug = DebugBundle {
                    name: bundle.name.clone(),
                    fields: bundle.fields.iter().map(DebugVariable::from_definition).collect(),
                };
                (bundle.name.clone(), debug)
            })
            .collect();
        let functions = assembly
            .methods
            .iter()
            .map(|method| (method.name.clone(), DebugFunction::from_method(method, source)))
            .collect();

        Self {
            namespace: assembly.namespace.clone(),
            original_file_name: source.file_name().to_string(),
            original_file_full_name: source.full_path().to_string(),
            md5_hash: md5_hex(source.text()),
            bundles,
            functions,
            native_functions: assembly.native_methods.iter().cloned().collect(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> String {
        // Only string keys and plain data; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Lowercase hex MD5 of `text`.
pub fn md5_hex(text: &str) -> String {
    Md5::digest(text.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hex() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_defaults_are_omitted() {
        let file = DebugFile {
            namespace: "game".into(),
            ..DebugFile::default()
        };
        assert_eq!(file.to_json(), "{\n  \"Namespace\": \"game\"\n}");
    }

    #[test]
    fn test_integer_keys_survive_round_trip() {
        let mut function = DebugFunction {
            name: "main".into(),
            line_number: 2,
            ..DebugFunction::default()
        };
        function.line_starting_opcode_index.insert(3, 0);
        function.line_starting_opcode_index.insert(4, 5);
        let mut file = DebugFile::default();
        file.functions.insert("main".into(), function);

        let json = file.to_json();
        assert!(json.contains("\"3\": 0"));
        assert_eq!(DebugFile::from_json(&json).unwrap(), file);
    }
}
