//! The emitted module and its textual form.
//!
//! ```text
//! # >> nebula - Version 1.0.0 <<
//!
//! .namespace "game"
//!
//! .bundle Point ( int x , int y )
//! .func void main (  ) ;autoexec
//! {
//! .locals [ int ]
//! 0000 ldc_i4 0
//! 0001 stloc 0
//! 0002 ret
//! }
//! ```

use crate::debug::DebugFile;
use crate::definitions::{BundleDefinition, MethodDefinition, VariableDefinition, Version};
use crate::error::EmitError;
use nebula_core::{SourceText, ASSEMBLY_EXTENSION, DEBUG_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const MODULE_NAME: &str = "nebula";
pub const VERSION: Version = Version::new(1, 0, 0);

/// One emitted compilation unit.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub module_name: String,
    pub version: Version,
    pub namespace: String,
    pub source: Rc<SourceText>,
    pub bundles: Vec<BundleDefinition>,
    pub methods: Vec<MethodDefinition>,
    pub native_methods: Vec<String>,
}

/// Paths written by [`Assembly::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub assembly: PathBuf,
    pub debug: PathBuf,
}

impl Assembly {
    pub fn new(
        module_name: impl Into<String>,
        version: Version,
        namespace: impl Into<String>,
        source: Rc<SourceText>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            version,
            namespace: namespace.into(),
            source,
            bundles: Vec::new(),
            methods: Vec::new(),
            native_methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Render the assembly text.
    pub fn to_text(&self) -> Result<String, EmitError> {
        let mut writer = AssemblyWriter::default();
        writer.line(&format!("# >> {} - Version {} <<", self.module_name, self.version));
        writer.line("");
        writer.line(&format!(".namespace \"{}\"", self.namespace));
        writer.line("");

        for bundle in &self.bundles {
            writer.line(&format!(".bundle {} {}", bundle.name, parameter_list(&bundle.fields)));
        }

        for method in &self.methods {
            let mut header = format!(
                ".func {} {} {}",
                method.return_type.assembly_name(),
                method.name,
                parameter_list(&method.parameters)
            );
            for attribute in &method.attributes {
                header.push_str(" ;");
                header.push_str(attribute.name());
            }
            writer.line(&header);
            writer.line("{");

            let locals: Vec<_> = method.locals.iter().map(|l| l.ty.assembly_name()).collect();
            writer.line(&format!(".locals [ {} ]", locals.join(", ")));
            for (index, instruction) in method.instructions.iter().enumerate() {
                let arguments = instruction.format_arguments()?;
                writer.line(&format!("{index:04X} {} {arguments}", instruction.opcode));
            }

            writer.line("}");
            writer.line("");
        }

        Ok(writer.finish())
    }

    pub fn debug_file(&self) -> DebugFile {
        DebugFile::from_assembly(self)
    }

    /// Write `{stem}.neb` and `{stem}.ndbg` into `folder`, where `stem` is the
    /// source file's stem.
    pub fn write(&self, folder: &Path) -> Result<OutputFiles, EmitError> {
        let stem = self.source.file_stem();
        let files = OutputFiles {
            assembly: folder.join(format!("{stem}.{ASSEMBLY_EXTENSION}")),
            debug: folder.join(format!("{stem}.{DEBUG_EXTENSION}")),
        };

        fs::create_dir_all(folder).map_err(|source| EmitError::Io {
            path: folder.to_path_buf(),
            source,
        })?;
        write_file(&files.assembly, &self.to_text()?)?;
        write_file(&files.debug, &self.debug_file().to_json())?;

        tracing::debug!(
            assembly = %files.assembly.display(),
            debug = %files.debug.display(),
            "wrote assembly"
        );
        Ok(files)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    fs::write(path, contents).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `( int x , int y )`; an empty list is `(  )`.
fn parameter_list(parameters: &[VariableDefinition]) -> String {
    let parameters: Vec<_> = parameters
        .iter()
        .map(|p| format!("{} {}", p.ty.assembly_name(), p.name))
        .collect();
    format!("( {} )", parameters.join(" , "))
}

#[derive(Default)]
struct AssemblyWriter {
    out: String,
}

impl AssemblyWriter {
    fn line(&mut self, text: &str) {
        self.out.push_str(text.trim_end());
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, Operand};
    use crate::opcode::Opcode;
    use nebula_binder::{Attribute, TypeSymbol};

    fn assembly() -> Assembly {
        let source = Rc::new(SourceText::new("game.nebula", ""));
        let mut assembly = Assembly::new(MODULE_NAME, VERSION, "game", source);
        assembly.bundles.push(BundleDefinition {
            name: "Point".into(),
            fields: vec![
                VariableDefinition::new("x", TypeSymbol::Int, 0),
                VariableDefinition::new("y", TypeSymbol::Int, 1),
            ],
        });
        assembly.methods.push(MethodDefinition {
            name: "start".into(),
            return_type: TypeSymbol::Void,
            attributes: vec![Attribute::AutoExec],
            parameters: vec![],
            locals: vec![VariableDefinition::new("p", TypeSymbol::named_bundle("game", "Point"), 0)],
            instructions: vec![
                Instruction::new(Opcode::LdB, Operand::Name("Point".into()), None),
                Instruction::new(Opcode::StLoc, Operand::Slot(0), None),
                Instruction::new(Opcode::Ret, Operand::None, None),
            ],
            span: None,
        });
        assembly
    }

    #[test]
    fn test_assembly_text() {
        let text = assembly().to_text().unwrap();
        let expected = "\
# >> nebula - Version 1.0.0 <<

.namespace \"game\"

.bundle Point ( int x , int y )
.func void start (  ) ;autoexec
{
.locals [ bundle ]
0000 ld_b Point
0001 stloc 0
0002 ret
}

";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_no_trailing_spaces() {
        let mut assembly = assembly();
        assembly.methods[0].attributes.clear();
        let text = assembly.to_text().unwrap();
        assert!(text.lines().all(|l| !l.ends_with(' ')));
        assert!(text.contains("\n.func void start (  )\n"));
    }

    #[test]
    fn test_write_files() {
        let folder = std::env::temp_dir().join(format!("nebula_emitter_write_{}", std::process::id()));
        let files = assembly().write(&folder).unwrap();
        assert!(files.assembly.ends_with("game.neb"));
        assert!(fs::read_to_string(&files.assembly).unwrap().starts_with("# >> nebula"));
        assert!(fs::read_to_string(&files.debug).unwrap().contains("\"Namespace\": \"game\""));
        fs::remove_dir_all(&folder).unwrap();
    }
}
