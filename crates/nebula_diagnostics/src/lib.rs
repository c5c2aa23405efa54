//! nebula_diagnostics: Diagnostics reported by every compiler stage.
//!
//! Stages never fail on a user mistake. They push a [`Diagnostic`] built
//! from one of the templates in [`messages`] onto a [`Report`] and carry on,
//! so a single run surfaces as many problems as possible.

use nebula_core::text::{LineAndColumn, TextSpan};
use nebula_core::SourceText;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
        })
    }
}

/// A message template. Placeholders `{0}`, `{1}`, ... are filled from the
/// arguments given when the diagnostic is reported.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

impl DiagnosticMessage {
    pub fn format(&self, args: &[&str]) -> String {
        args.iter()
            .enumerate()
            .fold(self.message.to_string(), |text, (i, arg)| {
                text.replace(&format!("{{{i}}}"), arg)
            })
    }
}

/// A reported problem. Located diagnostics keep a copy of the offending
/// line so they can be rendered after the source is dropped.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub position: Option<LineAndColumn>,
    pub line_text: Option<String>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic that belongs to no file.
    pub fn global(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            position: None,
            line_text: None,
            message_text: message.format(args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        source: &SourceText,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        let position = source.line_and_column_of(span.start);
        Self {
            file: Some(source.full_path().to_string()),
            span: Some(span),
            position: Some(position),
            line_text: Some(source.line_text(position.line).to_string()),
            ..Self::global(message, args)
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn is_warning(&self) -> bool {
        self.category == DiagnosticCategory::Warning
    }
}

/// `file(line,col): error NB10020: text`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.position) {
            (Some(file), Some(position)) => write!(f, "{file}({position}): ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            _ => {}
        }
        write!(f, "{} NB{}: {}", self.category, self.code, self.message_text)
    }
}

/// Diagnostics in the order they were reported.
#[derive(Debug, Clone, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        source: &SourceText,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) {
        self.diagnostics
            .push(Diagnostic::with_location(source, span, message, args));
    }

    pub fn report_global(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.push(Diagnostic::global(message, args));
    }

    pub fn extend(&mut self, other: Report) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.iter().filter(|d| d.is_warning()).count()
    }

    /// How many diagnostics were reported from `message`.
    pub fn count(&self, message: &DiagnosticMessage) -> usize {
        self.iter().filter(|d| d.code == message.code).count()
    }

    pub fn contains(&self, message: &DiagnosticMessage) -> bool {
        self.iter().any(|d| d.code == message.code)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl<'r> IntoIterator for &'r Report {
    type Item = &'r Diagnostic;
    type IntoIter = std::slice::Iter<'r, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Warnings (5000+)
    // ========================================================================
    pub const NAMESPACE_NOT_SET: DiagnosticMessage = diag!(5000, Warning, "Namespace not set, using '{0}' from the file name.");
    pub const UNREACHABLE_CODE: DiagnosticMessage = diag!(5001, Warning, "Unreachable code detected.");

    // ========================================================================
    // Syntax errors
    // ========================================================================
    pub const UNEXPECTED_GLOBAL_STATEMENT: DiagnosticMessage = diag!(10000, Error, "Unexpected global statement '{0}'.");
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!(10001, Error, "Unterminated string literal.");
    pub const NAMESPACE_ALREADY_SET: DiagnosticMessage = diag!(10005, Error, "Namespace is already set to '{0}'.");
    pub const NAMESPACE_MUST_BE_FIRST: DiagnosticMessage = diag!(10006, Error, "The namespace statement must be the first statement of the file.");
    pub const BAD_CHARACTER: DiagnosticMessage = diag!(10008, Error, "Bad character in input: '{0}'.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(10009, Error, "Unterminated multi-line comment.");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(10014, Error, "The number '{0}' is not a valid int.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(10037, Error, "Unexpected token '{0}', expected '{1}'.");

    // ========================================================================
    // Declaration errors
    // ========================================================================
    pub const VOID_FUNCTION_CANNOT_RETURN_VALUE: DiagnosticMessage = diag!(10002, Error, "Function '{0}' returns void and cannot return a value.");
    pub const NOT_ALL_PATHS_RETURN: DiagnosticMessage = diag!(10003, Error, "Not all code paths of '{0}' return a value.");
    pub const FUNCTION_EXPECTS_RETURN: DiagnosticMessage = diag!(10004, Error, "Function '{0}' expects a return value of type '{1}'.");
    pub const BUNDLE_ALREADY_EXISTS: DiagnosticMessage = diag!(10007, Error, "A bundle named '{0}' already exists.");
    pub const CANNOT_REASSIGN_READONLY: DiagnosticMessage = diag!(10010, Error, "Variable '{0}' is read-only and cannot be assigned.");
    pub const NATIVE_FUNCTION_ALREADY_EXISTS: DiagnosticMessage = diag!(10011, Error, "A native function named '{0}' already exists.");
    pub const PARAMETER_ALREADY_DECLARED: DiagnosticMessage = diag!(10012, Error, "A parameter named '{0}' is already declared.");
    pub const FIELD_ALREADY_DECLARED: DiagnosticMessage = diag!(10013, Error, "A field named '{0}' is already declared in bundle '{1}'.");
    pub const FUNCTION_ALREADY_EXISTS: DiagnosticMessage = diag!(10031, Error, "A function named '{0}' already exists.");
    pub const UNKNOWN_ATTRIBUTE: DiagnosticMessage = diag!(10029, Error, "Unknown attribute '{0}'.");
    pub const ATTRIBUTE_REQUIRES_VOID_RETURN: DiagnosticMessage = diag!(10033, Error, "Attribute '{0}' requires function '{1}' to return void.");
    pub const ATTRIBUTE_REQUIRES_ZERO_PARAMS: DiagnosticMessage = diag!(10034, Error, "Attribute '{0}' requires function '{1}' to have no parameters.");
    pub const TYPE_DOES_NOT_EXIST: DiagnosticMessage = diag!(10036, Error, "Type '{0}' does not exist.");
    pub const IMPORT_NOT_FOUND: DiagnosticMessage = diag!(10040, Error, "Imported namespace '{0}' was not found.");
    pub const REFERENCE_FIELD_COUNT_MISMATCH: DiagnosticMessage = diag!(10043, Error, "Reference bundle '{0}' declares {1} fields but {2} could be reconstructed.");
    pub const REFERENCE_UNKNOWN_TYPE: DiagnosticMessage = diag!(10044, Error, "Reference function '{0}' uses unknown type '{1}'.");

    // ========================================================================
    // Name resolution errors
    // ========================================================================
    pub const NAME_IS_NOT_A_VARIABLE: DiagnosticMessage = diag!(10015, Error, "'{0}' is not a variable.");
    pub const IDENTIFIER_IS_NOT_A_FUNCTION: DiagnosticMessage = diag!(10016, Error, "'{0}' is not a function.");
    pub const FIELD_DOES_NOT_EXIST: DiagnosticMessage = diag!(10017, Error, "Bundle '{0}' has no field named '{1}'.");
    pub const BUNDLE_DOES_NOT_EXIST: DiagnosticMessage = diag!(10018, Error, "Bundle '{0}' does not exist.");
    pub const VARIABLE_HAS_NO_FIELDS: DiagnosticMessage = diag!(10019, Error, "Variable '{0}' of type '{1}' does not have any fields.");
    pub const VARIABLE_DOES_NOT_EXIST: DiagnosticMessage = diag!(10020, Error, "Variable '{0}' does not exist.");
    pub const FUNCTION_DOES_NOT_EXIST: DiagnosticMessage = diag!(10025, Error, "Function '{0}' does not exist.");
    pub const VARIABLE_ALREADY_DECLARED: DiagnosticMessage = diag!(10028, Error, "A variable named '{0}' is already declared in this scope.");
    pub const VARIABLE_CANNOT_BE_INDEXED: DiagnosticMessage = diag!(10032, Error, "Variable '{0}' of type '{1}' cannot be indexed.");
    pub const WRONG_NUMBER_OF_INDICES: DiagnosticMessage = diag!(10035, Error, "Array '{0}' has rank {1} but was indexed with {2} indices.");

    // ========================================================================
    // Type errors
    // ========================================================================
    pub const BINARY_OPERATOR_NOT_DEFINED: DiagnosticMessage = diag!(10021, Error, "Binary operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const UNARY_OPERATOR_NOT_DEFINED: DiagnosticMessage = diag!(10022, Error, "Unary operator '{0}' is not defined for type '{1}'.");
    pub const VALUE_NOT_OF_TYPE: DiagnosticMessage = diag!(10023, Error, "Value is not of type '{0}'.");
    pub const WRONG_NUMBER_OF_ARGUMENTS: DiagnosticMessage = diag!(10024, Error, "Function '{0}' expects {1} arguments but was given {2}.");
    pub const CANNOT_CONVERT_IMPLICITLY: DiagnosticMessage = diag!(10026, Error, "Cannot implicitly convert '{0}' to '{1}'. An explicit conversion exists.");
    pub const CANNOT_CONVERT_TYPE: DiagnosticMessage = diag!(10027, Error, "Cannot convert type '{0}' to '{1}'.");
    pub const EXPRESSION_MUST_HAVE_VALUE: DiagnosticMessage = diag!(10030, Error, "Expression must have a value.");
    pub const WAIT_MUST_BE_INT: DiagnosticMessage = diag!(10041, Error, "Wait time must be of type 'int', found '{0}'.");
    pub const WAIT_TARGET_MUST_BE_BUNDLE: DiagnosticMessage = diag!(10042, Error, "The target of '{0}' must be a bundle, found '{1}'.");

    // ========================================================================
    // Statement errors
    // ========================================================================
    pub const INVALID_BREAK_OR_CONTINUE: DiagnosticMessage = diag!(10038, Error, "'{0}' can only be used inside a loop.");
    pub const INVALID_EXPRESSION_STATEMENT: DiagnosticMessage = diag!(10039, Error, "Only assignment and call expressions can be used as a statement.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_placeholders() {
        let text = messages::CANNOT_CONVERT_TYPE.format(&["int", "bool"]);
        assert_eq!(text, "Cannot convert type 'int' to 'bool'.");
        assert_eq!(messages::UNREACHABLE_CODE.format(&["unused"]), "Unreachable code detected.");
    }

    #[test]
    fn test_located_display() {
        let source = SourceText::new("game/main.nebula", "func void main()\n{\n    y = 2;\n}");
        let diag = Diagnostic::with_location(
            &source,
            TextSpan::new(23, 1),
            &messages::VARIABLE_DOES_NOT_EXIST,
            &["y"],
        );
        assert_eq!(
            diag.to_string(),
            "game/main.nebula(3,5): error NB10020: Variable 'y' does not exist."
        );
        assert_eq!(diag.line_text.as_deref(), Some("    y = 2;"));
    }

    #[test]
    fn test_global_display() {
        let diag = Diagnostic::global(&messages::UNREACHABLE_CODE, &[]);
        assert!(diag.file.is_none() && diag.span.is_none());
        assert!(diag.is_warning());
        assert_eq!(diag.to_string(), "warning NB5001: Unreachable code detected.");
    }

    #[test]
    fn test_report_counts() {
        let mut report = Report::new();
        assert!(report.is_empty());

        report.report_global(&messages::NAMESPACE_NOT_SET, &["main"]);
        assert!(!report.has_errors());
        assert_eq!(report.warning_count(), 1);

        report.report_global(&messages::FUNCTION_DOES_NOT_EXIST, &["foo"]);
        let mut other = Report::new();
        other.report_global(&messages::FUNCTION_DOES_NOT_EXIST, &["bar"]);
        report.extend(other);

        assert!(report.has_errors());
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.count(&messages::FUNCTION_DOES_NOT_EXIST), 2);
        assert!(!report.contains(&messages::UNEXPECTED_TOKEN));
        let codes: Vec<u32> = report.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![5000, 10025, 10025]);
    }
}
