//! Cross-program symbol resolution.
//!
//! A [`ProgramReferences`] belongs to one program. It resolves bundles and
//! functions of a namespace against the program itself, the sibling units
//! compiled in the same pass and the compiled reference scripts the program
//! imports. Siblings always win over scripts with the same namespace.
//! Symbols built from scripts are memoized per `(namespace, name)` so every
//! lookup yields the same `Rc`.

use crate::program::ProgramDeclarations;
use crate::script::{Script, ScriptBundle};
use crate::symbols::{
    Attribute, BundleField, BundleSymbol, Declaration, FunctionSymbol, ParameterSymbol, TypeSymbol,
};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use thiserror::Error;

/// A reference script whose shape cannot be reconstructed. Not recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("reference bundle '{namespace}::{bundle}' declares {declared} fields but {reconstructed} could be reconstructed")]
    FieldCountMismatch {
        namespace: String,
        bundle: String,
        declared: usize,
        reconstructed: usize,
    },
    #[error("reference function '{namespace}::{function}' uses unknown type '{type_name}'")]
    UnknownType {
        namespace: String,
        function: String,
        type_name: String,
    },
}

/// Rebuild a script bundle's fields. Fields whose type name is not
/// understood are dropped, so a count that no longer matches the declared
/// one means the script is corrupt.
pub fn materialize_bundle(namespace: &str, source: &ScriptBundle) -> Result<BundleSymbol, ReferenceError> {
    let fields: Vec<BundleField> = source
        .fields
        .iter()
        .filter_map(|field| TypeSymbol::from_script_name(&field.type_name).map(|ty| (ty, field.name.clone())))
        .enumerate()
        .map(|(ordinal, (ty, name))| BundleField {
            ty,
            name,
            ordinal: ordinal as u32,
        })
        .collect();
    if fields.len() != source.field_count {
        return Err(ReferenceError::FieldCountMismatch {
            namespace: namespace.to_string(),
            bundle: source.name.clone(),
            declared: source.field_count,
            reconstructed: fields.len(),
        });
    }
    Ok(BundleSymbol {
        name: source.name.clone(),
        namespace: namespace.to_string(),
        fields,
        span: None,
    })
}

type CacheKey = (String, String);

/// The resolution context of one program for one compilation. Materialized
/// script symbols are cached on the instance, never shared between programs
/// or compilations.
#[derive(Debug)]
pub struct ProgramReferences {
    namespace: String,
    programs: FxHashMap<String, Rc<ProgramDeclarations>>,
    scripts: FxHashMap<String, Rc<Script>>,
    bundle_cache: FxHashMap<CacheKey, Rc<BundleSymbol>>,
    function_cache: FxHashMap<CacheKey, Rc<FunctionSymbol>>,
}

impl ProgramReferences {
    pub fn new(program: Rc<ProgramDeclarations>) -> Self {
        let namespace = program.namespace.clone();
        let mut programs = FxHashMap::default();
        programs.insert(namespace.clone(), program);
        Self {
            namespace,
            programs,
            scripts: FxHashMap::default(),
            bundle_cache: FxHashMap::default(),
            function_cache: FxHashMap::default(),
        }
    }

    /// Namespace of the owning program.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Register a sibling program. The owning program cannot be replaced.
    pub fn add_program(&mut self, program: Rc<ProgramDeclarations>) {
        if program.namespace != self.namespace {
            self.programs.insert(program.namespace.clone(), program);
        }
    }

    pub fn add_script(&mut self, script: Rc<Script>) {
        self.scripts.insert(script.namespace.clone(), script);
    }

    pub fn bundle(
        &mut self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Rc<BundleSymbol>>, ReferenceError> {
        if let Some(program) = self.programs.get(namespace) {
            return Ok(program.bundles.get(name).cloned());
        }
        let key = (namespace.to_string(), name.to_string());
        if let Some(bundle) = self.bundle_cache.get(&key) {
            return Ok(Some(Rc::clone(bundle)));
        }
        let Some(script) = self.scripts.get(namespace) else {
            return Ok(None);
        };
        let Some(source) = script.bundles.get(name) else {
            return Ok(None);
        };

        let bundle = Rc::new(materialize_bundle(namespace, source)?);
        tracing::trace!(namespace, name, "materialized reference bundle");
        self.bundle_cache.insert(key, Rc::clone(&bundle));
        Ok(Some(bundle))
    }

    pub fn function(
        &mut self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Rc<FunctionSymbol>>, ReferenceError> {
        if let Some(program) = self.programs.get(namespace) {
            return Ok(program.function(name).cloned());
        }
        let key = (namespace.to_string(), name.to_string());
        if let Some(function) = self.function_cache.get(&key) {
            return Ok(Some(Rc::clone(function)));
        }
        let Some(source) = self.scripts.get(namespace).and_then(|s| s.functions.get(name)) else {
            return Ok(None);
        };
        let script_type = |type_name: &str| {
            TypeSymbol::from_script_name(type_name).ok_or_else(|| ReferenceError::UnknownType {
                namespace: namespace.to_string(),
                function: source.name.clone(),
                type_name: type_name.to_string(),
            })
        };

        let parameters = source
            .parameters
            .iter()
            .enumerate()
            .map(|(ordinal, type_name)| -> Result<_, ReferenceError> {
                Ok(Rc::new(ParameterSymbol {
                    name: format!("{ordinal}_{type_name}"),
                    ty: script_type(type_name)?,
                    ordinal: ordinal as u32,
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let attributes = source
            .attributes
            .iter()
            .filter_map(|a| Attribute::from_name(a))
            .collect();
        let function = Rc::new(FunctionSymbol {
            name: source.name.clone(),
            parameters,
            attributes,
            return_type: script_type(&source.return_type)?,
            declaration: Declaration::Compiled {
                namespace: namespace.to_string(),
            },
        });
        tracing::trace!(namespace, name, "materialized reference function");
        self.function_cache.insert(key, Rc::clone(&function));
        Ok(Some(function))
    }
}
