//! Symbol definitions.
//!
//! Symbols are immutable once created. Functions, bundles, variables and
//! parameters are shared through `Rc` so bound nodes can refer to the exact
//! instance a name resolved to.

use nebula_core::TextSpan;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Types
// ============================================================================

/// The type of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    /// Produced by failed binding. Converts silently to and from anything.
    Error,
    Bool,
    Int,
    String,
    Void,
    /// Any bundle instance, regardless of its declared shape.
    Bundle,
    /// A declared bundle, identified by its owning namespace and name.
    NamedBundle { namespace: String, alias: String },
    Array { value: Box<TypeSymbol>, rank: u32 },
}

impl TypeSymbol {
    pub fn named_bundle(namespace: impl Into<String>, alias: impl Into<String>) -> Self {
        TypeSymbol::NamedBundle {
            namespace: namespace.into(),
            alias: alias.into(),
        }
    }

    pub fn array(value: TypeSymbol, rank: u32) -> Self {
        TypeSymbol::Array {
            value: Box::new(value),
            rank,
        }
    }

    /// Builtin type for a keyword-like type name.
    pub fn from_builtin_name(name: &str) -> Option<TypeSymbol> {
        let ty = match name {
            "int" => TypeSymbol::Int,
            "bool" => TypeSymbol::Bool,
            "string" => TypeSymbol::String,
            "void" => TypeSymbol::Void,
            "bundle" => TypeSymbol::Bundle,
            _ => return None,
        };
        Some(ty)
    }

    /// Parse a type name as written in compiled assembly (`int`, `bundle`,
    /// `int[,]`).
    pub fn from_script_name(name: &str) -> Option<TypeSymbol> {
        match name.find('[') {
            Some(open) => {
                let suffix = &name[open..];
                if !suffix.ends_with(']') || suffix[1..suffix.len() - 1].chars().any(|c| c != ',') {
                    return None;
                }
                let value = TypeSymbol::from_builtin_name(&name[..open])?;
                Some(TypeSymbol::array(value, suffix.len() as u32 - 1))
            }
            None => TypeSymbol::from_builtin_name(name),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeSymbol::Error)
    }

    /// Generic or named bundle.
    pub fn is_bundle(&self) -> bool {
        matches!(self, TypeSymbol::Bundle | TypeSymbol::NamedBundle { .. })
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            TypeSymbol::Error => Cow::Borrowed("?"),
            TypeSymbol::Bool => Cow::Borrowed("bool"),
            TypeSymbol::Int => Cow::Borrowed("int"),
            TypeSymbol::String => Cow::Borrowed("string"),
            TypeSymbol::Void => Cow::Borrowed("void"),
            TypeSymbol::Bundle => Cow::Borrowed("bundle"),
            TypeSymbol::NamedBundle { alias, .. } => Cow::Borrowed(alias),
            TypeSymbol::Array { value, rank } => Cow::Owned(format!("{}{}", value.name(), rank_suffix(*rank))),
        }
    }

    /// The name used in assembly text. Named bundles are written as the
    /// generic `bundle` type.
    pub fn assembly_name(&self) -> Cow<'_, str> {
        match self {
            TypeSymbol::NamedBundle { .. } => Cow::Borrowed("bundle"),
            TypeSymbol::Array { value, rank } => {
                Cow::Owned(format!("{}{}", value.assembly_name(), rank_suffix(*rank)))
            }
            _ => self.name(),
        }
    }
}

fn rank_suffix(rank: u32) -> String {
    let mut suffix = String::from("[");
    for _ in 1..rank {
        suffix.push(',');
    }
    suffix.push(']');
    suffix
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ============================================================================
// Constants
// ============================================================================

/// A compile-time value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    Int(i32),
    Bool(bool),
    String(String),
}

impl ConstantValue {
    pub fn ty(&self) -> TypeSymbol {
        match self {
            ConstantValue::Int(_) => TypeSymbol::Int,
            ConstantValue::Bool(_) => TypeSymbol::Bool,
            ConstantValue::String(_) => TypeSymbol::String,
        }
    }
}

// ============================================================================
// Variables & parameters
// ============================================================================

/// Identifies a local within its function. Issued in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub id: VariableId,
    pub name: String,
    pub ty: TypeSymbol,
    pub is_readonly: bool,
    /// Only set for read-only variables with a constant initializer.
    pub constant: Option<ConstantValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeSymbol,
    /// Position in the parameter list, also the parameter's slot.
    pub ordinal: u32,
}

// ============================================================================
// Functions
// ============================================================================

/// Function attributes. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Run automatically when the module is loaded.
    AutoExec,
}

impl Attribute {
    pub const ALL: &'static [Attribute] = &[Attribute::AutoExec];

    pub fn from_name(name: &str) -> Option<Attribute> {
        Attribute::ALL.iter().copied().find(|a| a.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::AutoExec => "autoexec",
        }
    }
}

/// Where a function came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Declared with a body in a unit being compiled.
    User { span: TextSpan, name_span: TextSpan },
    /// `native func ...;` in a unit being compiled.
    Native { span: TextSpan },
    /// Materialized from a compiled reference script.
    Compiled { namespace: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    pub parameters: Vec<Rc<ParameterSymbol>>,
    pub attributes: Vec<Attribute>,
    pub return_type: TypeSymbol,
    pub declaration: Declaration,
}

impl FunctionSymbol {
    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn is_native(&self) -> bool {
        matches!(self.declaration, Declaration::Native { .. })
    }
}

// ============================================================================
// Bundles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleField {
    pub ty: TypeSymbol,
    pub name: String,
    /// Layout position; the field's index in the runtime record.
    pub ordinal: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleSymbol {
    pub name: String,
    pub namespace: String,
    pub fields: Vec<BundleField>,
    /// Declaration span; `None` for bundles materialized from references.
    pub span: Option<TextSpan>,
}

impl BundleSymbol {
    pub fn field(&self, name: &str) -> Option<&BundleField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn ty(&self) -> TypeSymbol {
        TypeSymbol::named_bundle(self.namespace.as_str(), self.name.as_str())
    }
}

// ============================================================================
// Symbol
// ============================================================================

/// Anything a name can resolve to.
#[derive(Debug, Clone)]
pub enum Symbol {
    Function(Rc<FunctionSymbol>),
    LocalVariable(Rc<VariableSymbol>),
    Parameter(Rc<ParameterSymbol>),
    Type(TypeSymbol),
    Attribute(Attribute),
    Bundle(Rc<BundleSymbol>),
}

impl Symbol {
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Symbol::Function(f) => Cow::Borrowed(&f.name),
            Symbol::LocalVariable(v) => Cow::Borrowed(&v.name),
            Symbol::Parameter(p) => Cow::Borrowed(&p.name),
            Symbol::Type(t) => t.name(),
            Symbol::Attribute(a) => Cow::Borrowed(a.name()),
            Symbol::Bundle(b) => Cow::Borrowed(&b.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_names() {
        let ty = TypeSymbol::array(TypeSymbol::Int, 2);
        assert_eq!(ty.name(), "int[,]");
        let bundle = TypeSymbol::array(TypeSymbol::named_bundle("game", "Point"), 1);
        assert_eq!(bundle.name(), "Point[]");
        assert_eq!(bundle.assembly_name(), "bundle[]");
    }

    #[test]
    fn test_from_script_name() {
        assert_eq!(TypeSymbol::from_script_name("string"), Some(TypeSymbol::String));
        assert_eq!(
            TypeSymbol::from_script_name("bool[,,]"),
            Some(TypeSymbol::array(TypeSymbol::Bool, 3))
        );
        assert_eq!(TypeSymbol::from_script_name("Point"), None);
        assert_eq!(TypeSymbol::from_script_name("int[x]"), None);
    }

    #[test]
    fn test_attribute_lookup() {
        assert_eq!(Attribute::from_name("autoexec"), Some(Attribute::AutoExec));
        assert_eq!(Attribute::from_name("AutoExec"), None);
    }
}
