//! Reads compiled assembly text back into reference [`Script`]s.
//!
//! Only the declaration headers matter:
//!
//! ```text
//! .namespace "util"
//! .bundle Pair ( int a , int b )
//! .func int twice ( int x ) ;autoexec
//! ```
//!
//! Function bodies between `{` and `}` are skipped.

use nebula_binder::{Script, ScriptBundle, ScriptField, ScriptFunction};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("assembly declares no namespace")]
    MissingNamespace,

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Parser for the header lines of an assembly file.
#[derive(Debug, Default)]
pub struct ScriptLoader {
    namespace: Option<String>,
    bundles: Vec<ScriptBundle>,
    functions: Vec<ScriptFunction>,
    in_body: bool,
}

impl ScriptLoader {
    pub fn load_file(path: &Path) -> Result<Script, ScriptLoadError> {
        let text = std::fs::read_to_string(path)?;
        let script = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            namespace = %script.namespace,
            bundles = script.bundles.len(),
            functions = script.functions.len(),
            "loaded reference script"
        );
        Ok(script)
    }

    pub fn parse(text: &str) -> Result<Script, ScriptLoadError> {
        let mut loader = ScriptLoader::default();
        for (index, line) in text.lines().enumerate() {
            loader.line(line.trim()).map_err(|message| ScriptLoadError::Malformed {
                line: index + 1,
                message,
            })?;
        }
        loader.finish()
    }

    fn line(&mut self, line: &str) -> Result<(), String> {
        if self.in_body {
            if line == "}" {
                self.in_body = false;
            }
            return Ok(());
        }
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        if line == "{" {
            self.in_body = true;
            return Ok(());
        }

        let (directive, rest) = line.split_once(' ').unwrap_or((line, ""));
        match directive {
            ".namespace" => self.namespace_line(rest.trim()),
            ".bundle" => self.bundle_line(rest),
            ".func" => self.function_line(rest),
            other => Err(format!("unexpected '{other}'")),
        }
    }

    fn namespace_line(&mut self, rest: &str) -> Result<(), String> {
        if self.namespace.is_some() {
            return Err("namespace declared twice".to_string());
        }
        let name = rest
            .strip_prefix('"')
            .and_then(|r| r.strip_suffix('"'))
            .ok_or_else(|| format!("expected a quoted namespace, found '{rest}'"))?;
        self.namespace = Some(name.to_string());
        Ok(())
    }

    fn bundle_line(&mut self, rest: &str) -> Result<(), String> {
        let (name, parameters, trailing) = split_signature(rest)?;
        let [name] = name[..] else {
            return Err("expected a bundle name".to_string());
        };
        if !trailing.is_empty() {
            return Err(format!("unexpected '{}' after bundle fields", trailing.join(" ")));
        }
        let fields: Vec<_> = parameters
            .into_iter()
            .map(|(type_name, name)| ScriptField { name, type_name })
            .collect();
        self.bundles.push(ScriptBundle {
            name: name.to_string(),
            field_count: fields.len(),
            fields,
        });
        Ok(())
    }

    fn function_line(&mut self, rest: &str) -> Result<(), String> {
        let (head, parameters, trailing) = split_signature(rest)?;
        let [return_type, name] = head[..] else {
            return Err("expected a return type and a function name".to_string());
        };
        let attributes = trailing
            .iter()
            .map(|token| {
                token
                    .strip_prefix(';')
                    .map(str::to_string)
                    .ok_or_else(|| format!("expected ';attribute', found '{token}'"))
            })
            .collect::<Result<_, _>>()?;
        self.functions.push(ScriptFunction {
            name: name.to_string(),
            return_type: return_type.to_string(),
            parameters: parameters.into_iter().map(|(ty, _)| ty).collect(),
            attributes,
        });
        Ok(())
    }

    fn finish(self) -> Result<Script, ScriptLoadError> {
        let namespace = self.namespace.ok_or(ScriptLoadError::MissingNamespace)?;
        let mut script = Script::new(namespace);
        for bundle in self.bundles {
            script.add_bundle(bundle);
        }
        for function in self.functions {
            script.add_function(function);
        }
        Ok(script)
    }
}

type Signature<'a> = (Vec<&'a str>, Vec<(String, String)>, Vec<&'a str>);

/// Split `head ( type name , type name ) trailing` into its three parts.
fn split_signature(text: &str) -> Result<Signature<'_>, String> {
    let open = text.find('(').ok_or("expected '('")?;
    let close = text.rfind(')').filter(|&c| c > open).ok_or("expected ')'")?;

    let head = text[..open].split_whitespace().collect();
    let trailing = text[close + 1..].split_whitespace().collect();

    let tokens: Vec<_> = text[open + 1..close].split_whitespace().collect();
    let mut parameters = Vec::new();
    if !tokens.is_empty() {
        for group in tokens.split(|t| *t == ",") {
            let [ty, name] = group else {
                return Err(format!("expected 'type name', found '{}'", group.join(" ")));
            };
            parameters.push((ty.to_string(), name.to_string()));
        }
    }
    Ok((head, parameters, trailing))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "\
# >> nebula - Version 1.0.0 <<

.namespace \"util\"

.bundle Pair ( int a , string b )
.bundle Empty (  )
.func int[,] grid ( int w , int h )
{
.locals [ int[,] ]
0000 newarr int 2
0001 ret
}

.func void start (  ) ;autoexec
{
.locals [  ]
0000 ret
}
";

    #[test]
    fn test_parse_headers() {
        let script = ScriptLoader::parse(TEXT).unwrap();
        assert_eq!(script.namespace, "util");

        let pair = &script.bundles["Pair"];
        assert_eq!(pair.field_count, 2);
        assert_eq!(pair.fields[1].name, "b");
        assert_eq!(pair.fields[1].type_name, "string");
        assert_eq!(script.bundles["Empty"].field_count, 0);

        let grid = &script.functions["grid"];
        assert_eq!(grid.return_type, "int[,]");
        assert_eq!(grid.parameters, ["int", "int"]);
        assert_eq!(script.functions["start"].attributes, ["autoexec"]);
    }

    #[test]
    fn test_missing_namespace() {
        assert!(matches!(
            ScriptLoader::parse(".func void f (  )\n"),
            Err(ScriptLoadError::MissingNamespace)
        ));
    }

    #[test]
    fn test_malformed_lines() {
        let err = ScriptLoader::parse(".namespace \"a\"\n.bundle P ( int )\n").unwrap_err();
        assert!(matches!(err, ScriptLoadError::Malformed { line: 2, .. }));

        let err = ScriptLoader::parse(".namespace a\n").unwrap_err();
        assert!(matches!(err, ScriptLoadError::Malformed { line: 1, .. }));

        let err = ScriptLoader::parse(".namespace \"a\"\nldc_i4 0\n").unwrap_err();
        assert!(matches!(err, ScriptLoadError::Malformed { line: 2, .. }));
    }
}
