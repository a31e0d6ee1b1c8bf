use std::fmt;

use thiserror::Error;

use crate::syntax::ast::Span;

/// Error codes prefixed by phase: L = lexer, P = parser, S = semantic, N = note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal

    // Parser
    P001, // unexpected token
    P002, // missing expected token
    P003, // unsupported literal
    P004, // nesting too deep

    // Semantic / resolver
    S001, // unresolved name
    S002, // type mismatch
    S003, // duplicate binding in the same scope
    S004, // duplicate entry point
    S005, // block ends with a non-expression statement
    S006, // callee is not a function
    S007, // symbol used before its type is known
    S008, // empty array literal without annotation
    S009, // unsupported member access
    S010, // wrong argument count

    // Notes
    N001, // module import is not resolved
}

impl ErrorCode {
    pub fn severity(&self) -> Severity {
        match self {
            Self::N001 => Severity::Note,
            _ => Severity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::S001 => "S001",
            Self::S002 => "S002",
            Self::S003 => "S003",
            Self::S004 => "S004",
            Self::S005 => "S005",
            Self::S006 => "S006",
            Self::S007 => "S007",
            Self::S008 => "S008",
            Self::S009 => "S009",
            Self::S010 => "S010",
            Self::N001 => "N001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from least to most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Note    => "note",
            Self::Warning => "warning",
            Self::Error   => "error",
            Self::Fatal   => "fatal",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {severity} at {span}: {message}")]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self { code, severity: code.severity(), span, message: message.into() }
    }
}

// ─── Sink ────────────────────────────────────────────────────────────────────

/// Collects reported diagnostics and tracks the most severe level seen so far.
///
/// Callers poll [`Diagnostics::has_errors`] between stages; nothing here unwinds
/// except [`Diagnostics::fatal`].
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    most_severe: Option<Severity>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, code: ErrorCode, span: Span, message: impl Into<String>) {
        let diag = Diagnostic::new(code, span, message);
        match diag.severity {
            Severity::Note    => tracing::info!(code = %diag.code, %span, "{}", diag.message),
            Severity::Warning => tracing::warn!(code = %diag.code, %span, "{}", diag.message),
            _                 => tracing::error!(code = %diag.code, %span, "{}", diag.message),
        }
        self.most_severe = self.most_severe.max(Some(diag.severity));
        self.entries.push(diag);
    }

    /// Internal invariant violation. Never recovered.
    #[track_caller]
    pub fn fatal(&self, span: Span, message: impl fmt::Display) -> ! {
        tracing::error!(%span, "internal compiler error: {message}");
        panic!("internal compiler error at {span}: {message}");
    }

    pub fn most_severe(&self) -> Option<Severity> {
        self.most_severe
    }

    pub fn has_errors(&self) -> bool {
        self.most_severe >= Some(Severity::Error)
    }

    /// Forgets the watermark but keeps the recorded entries.
    pub fn reset_watermark(&mut self) {
        self.most_severe = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, code: ErrorCode) -> usize {
        self.entries.iter().filter(|d| d.code == code).count()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.severity >= Severity::Error).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Pipeline failure ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Resolve,
    TypeCheck,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse     => "parsing",
            Self::Resolve   => "name resolution",
            Self::TypeCheck => "type checking",
        })
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("{stage} failed with {} diagnostic(s)", .diagnostics.len())]
    Stage { stage: Stage, diagnostics: Vec<Diagnostic> },
}

impl CompileError {
    /// Snapshot of everything reported so far, attributed to `stage`.
    pub fn from_stage(stage: Stage, diagnostics: &Diagnostics) -> Self {
        Self::Stage { stage, diagnostics: diagnostics.iter().cloned().collect() }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Io(_) => &[],
            Self::Stage { diagnostics, .. } => diagnostics,
        }
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.diagnostics().iter().any(|d| d.code == code)
    }
}
