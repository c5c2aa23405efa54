//! Lexical scopes.
//!
//! Scopes form a chain from inner to outer. A name is unique within one
//! scope but may shadow a symbol of the same name in any ancestor.

use crate::symbols::{Attribute, Symbol, TypeSymbol};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: FxHashMap<String, Symbol>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    pub fn new(parent: Option<Box<Scope>>) -> Self {
        Self {
            symbols: FxHashMap::default(),
            parent,
        }
    }

    /// The root scope holding builtin types and attributes.
    pub fn builtins() -> Self {
        let mut scope = Scope::new(None);
        for ty in [
            TypeSymbol::Int,
            TypeSymbol::Bool,
            TypeSymbol::String,
            TypeSymbol::Void,
            TypeSymbol::Bundle,
        ] {
            scope.declare(Symbol::Type(ty));
        }
        for attribute in Attribute::ALL {
            scope.declare(Symbol::Attribute(*attribute));
        }
        scope
    }

    /// Declare a symbol. Returns `false` and leaves the scope unchanged if
    /// the name already exists in this scope.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        let name = symbol.name().into_owned();
        if self.symbols.contains_key(&name) {
            return false;
        }
        self.symbols.insert(name, symbol);
        true
    }

    /// Find the innermost symbol with this name.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(symbol) = current.symbols.get(name) {
                return Some(symbol);
            }
            scope = current.parent.as_deref();
        }
        None
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_deref()
    }

    /// A new empty scope whose parent is `self`.
    pub fn into_child(self) -> Scope {
        Scope::new(Some(Box::new(self)))
    }

    /// Drop this scope and return its parent.
    pub fn into_parent(mut self) -> Option<Scope> {
        self.parent.take().map(|parent| *parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let scope = Scope::builtins();
        assert!(matches!(scope.lookup("int"), Some(Symbol::Type(TypeSymbol::Int))));
        assert!(matches!(scope.lookup("autoexec"), Some(Symbol::Attribute(Attribute::AutoExec))));
        assert!(scope.lookup("float").is_none());
    }

    #[test]
    fn test_into_parent_restores_outer() {
        let mut outer = Scope::new(None);
        outer.declare(Symbol::Type(TypeSymbol::Int));
        let inner = outer.into_child();
        assert!(inner.lookup_local("int").is_none());
        assert!(inner.lookup("int").is_some());
        let outer = inner.into_parent().unwrap();
        assert!(outer.lookup_local("int").is_some());
    }
}
