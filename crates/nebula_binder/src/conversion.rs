//! Conversion classification between types.

use crate::symbols::TypeSymbol;

/// How a value of one type may become another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    Identity,
    Implicit,
    Explicit,
}

impl Conversion {
    pub fn classify(from: &TypeSymbol, to: &TypeSymbol) -> Conversion {
        if from == to {
            return Conversion::Identity;
        }
        match (from, to) {
            (TypeSymbol::NamedBundle { .. }, TypeSymbol::Bundle) => Conversion::Identity,
            (TypeSymbol::Int, TypeSymbol::NamedBundle { .. }) => Conversion::Implicit,
            (TypeSymbol::Int | TypeSymbol::Bool, TypeSymbol::String) => Conversion::Explicit,
            (TypeSymbol::String, TypeSymbol::Int | TypeSymbol::Bool) => Conversion::Explicit,
            _ => Conversion::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_primitives() {
        for ty in [
            TypeSymbol::Bool,
            TypeSymbol::Int,
            TypeSymbol::String,
            TypeSymbol::Void,
            TypeSymbol::Bundle,
            TypeSymbol::Error,
        ] {
            assert_eq!(Conversion::classify(&ty, &ty), Conversion::Identity);
        }
    }

    #[test]
    fn test_int_to_named_bundle_is_one_way() {
        let point = TypeSymbol::named_bundle("game", "Point");
        assert_eq!(Conversion::classify(&TypeSymbol::Int, &point), Conversion::Implicit);
        assert_eq!(Conversion::classify(&point, &TypeSymbol::Int), Conversion::None);
        assert_eq!(Conversion::classify(&TypeSymbol::Int, &TypeSymbol::Bundle), Conversion::None);
    }

    #[test]
    fn test_string_conversions_are_explicit() {
        assert_eq!(Conversion::classify(&TypeSymbol::Int, &TypeSymbol::String), Conversion::Explicit);
        assert_eq!(Conversion::classify(&TypeSymbol::Bool, &TypeSymbol::String), Conversion::Explicit);
        assert_eq!(Conversion::classify(&TypeSymbol::String, &TypeSymbol::Int), Conversion::Explicit);
        assert_eq!(Conversion::classify(&TypeSymbol::String, &TypeSymbol::Bool), Conversion::Explicit);
        assert_eq!(Conversion::classify(&TypeSymbol::Bool, &TypeSymbol::Int), Conversion::None);
        assert_eq!(Conversion::classify(&TypeSymbol::Int, &TypeSymbol::Bool), Conversion::None);
    }

    #[test]
    fn test_named_bundles_are_distinct() {
        let point = TypeSymbol::named_bundle("game", "Point");
        let other = TypeSymbol::named_bundle("util", "Point");
        assert_eq!(Conversion::classify(&point, &other), Conversion::None);
        assert_eq!(Conversion::classify(&point, &TypeSymbol::Bundle), Conversion::Identity);
    }
}
