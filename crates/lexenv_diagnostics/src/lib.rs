//! lexenv_diagnostics: Diagnostic messages reported while driving scopes.
//!
//! Scope operations themselves never produce user-facing text. The driver
//! turns their outcomes (final reassignment, unresolved names, slot limits)
//! into the categorized diagnostics defined here.

use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The trace or source file the diagnostic belongs to, if any.
    pub file: Option<String>,
    /// 1-based line within `file`.
    pub line: Option<u32>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            line: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: Option<String>,
        line: Option<u32>,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file,
            line,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(line) = self.line {
                write!(f, "({})", line)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} LX{}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, ... in `template` with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated while driving one or more scope chains.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Warning)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Codes in report order. Mostly useful in tests.
    pub fn codes(&self) -> Vec<u32> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
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
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Trace input (1000-1099)
    // ========================================================================
    pub const UNKNOWN_TRACE_COMMAND_0: DiagnosticMessage = diag!(1001, Error, "Unknown trace command '{0}'.");
    pub const MALFORMED_TRACE_LINE_0: DiagnosticMessage = diag!(1002, Error, "Malformed trace line: {0}.");
    pub const UNKNOWN_TYPE_0: DiagnosticMessage = diag!(1003, Error, "Unknown type '{0}'.");

    // ========================================================================
    // Binding errors (2000-2799)
    // ========================================================================
    pub const CANNOT_FIND_NAME_0: DiagnosticMessage = diag!(2304, Error, "Cannot find name '{0}'.");
    pub const REDECLARATION_OF_0_REUSES_EXISTING_BINDING: DiagnosticMessage = diag!(2451, Warning, "Redeclaration of '{0}' with a different type or modifiers reuses the existing binding.");
    pub const CANNOT_REASSIGN_FINAL_BINDING_0: DiagnosticMessage = diag!(2588, Error, "Cannot reassign final binding '{0}'.");

    // ========================================================================
    // Resource limits and internal errors (2800-2999)
    // ========================================================================
    pub const SCOPE_EXCEEDS_MAXIMUM_OF_0_SLOTS: DiagnosticMessage = diag!(2800, Error, "Scope exceeds the maximum of {0} slots.");
    pub const INTERNAL_SCOPE_ERROR_0: DiagnosticMessage = diag!(2900, Error, "Internal scope error: {0}");
    pub const SCOPES_LEFT_OPEN_0: DiagnosticMessage = diag!(2901, Message, "{0} scope(s) were still open at the end of the trace and have been closed.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let diag = Diagnostic::new(&messages::CANNOT_REASSIGN_FINAL_BINDING_0, &["total"]);
        assert_eq!(diag.message_text, "Cannot reassign final binding 'total'.");
        assert_eq!(diag.code, 2588);
        assert!(diag.is_error());
    }

    #[test]
    fn test_display_with_location() {
        let diag = Diagnostic::with_location(
            Some("main.trace".to_string()),
            Some(7),
            &messages::CANNOT_FIND_NAME_0,
            &["q"],
        );
        assert_eq!(diag.to_string(), "main.trace(7): error LX2304: Cannot find name 'q'.");
    }

    #[test]
    fn test_collection_counts_keep_report_order() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::with_location(Some("b".into()), Some(1), &messages::CANNOT_FIND_NAME_0, &["x"]));
        diags.add(Diagnostic::with_location(
            Some("a".into()),
            Some(9),
            &messages::REDECLARATION_OF_0_REUSES_EXISTING_BINDING,
            &["y"],
        ));
        diags.add(Diagnostic::with_location(Some("a".into()), Some(2), &messages::CANNOT_FIND_NAME_0, &["z"]));

        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.warning_count(), 1);
        assert_eq!(diags.codes(), vec![2304, 2451, 2304]);
        let files: Vec<_> = diags.diagnostics().iter().map(|d| d.file.as_deref()).collect();
        assert_eq!(files, vec![Some("b"), Some("a"), Some("a")]);
    }
}
