use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Everything that can abort a translation session.
///
/// Translation is a deterministic single pass, so none of these are
/// retryable: the first error ends the session and its output is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A push/pop names a segment that does not exist, or addresses it in a
    /// way the segment does not support (`pop constant`, `temp 8`).
    InvalidSegment {
        unit: String,
        span: Span,
        segment: String,
        reason: String,
    },
    /// A line whose keyword or operands do not form a valid command.
    MalformedCommand {
        unit: String,
        span: Span,
        message: String,
    },
    /// The output sink or an input file could not be read, written or closed.
    Io { path: String, message: String },
    /// A `vmlower.toml` value that cannot be understood.
    Config { path: String, message: String },
    /// No lowering exists for the requested target name.
    UnknownTarget(String),
}

pub type TranslateResult<T> = Result<T, TranslateError>;

impl TranslateError {
    pub fn invalid_segment(
        unit: &str,
        span: Span,
        segment: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TranslateError::InvalidSegment {
            unit: unit.to_string(),
            span,
            segment: segment.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(unit: &str, span: Span, message: impl Into<String>) -> Self {
        TranslateError::MalformedCommand {
            unit: unit.to_string(),
            span,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        TranslateError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// The source unit the error points into, if any.
    pub fn unit(&self) -> Option<&str> {
        match self {
            TranslateError::InvalidSegment { unit, .. }
            | TranslateError::MalformedCommand { unit, .. } => Some(unit),
            TranslateError::Io { .. }
            | TranslateError::Config { .. }
            | TranslateError::UnknownTarget(_) => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            TranslateError::InvalidSegment { span, .. }
            | TranslateError::MalformedCommand { span, .. } => Some(*span),
            TranslateError::Io { .. }
            | TranslateError::Config { .. }
            | TranslateError::UnknownTarget(_) => None,
        }
    }

    fn headline(&self) -> String {
        match self {
            TranslateError::InvalidSegment {
                segment, reason, ..
            } => format!("invalid segment '{}': {}", segment, reason),
            TranslateError::MalformedCommand { message, .. } => {
                format!("malformed command: {}", message)
            }
            TranslateError::Io { path, message } => {
                format!("cannot access '{}': {}", path, message)
            }
            TranslateError::Config { path, message } => format!("{}: {}", path, message),
            TranslateError::UnknownTarget(name) => format!("unknown target '{}'", name),
        }
    }

    /// Convert into a renderable diagnostic anchored at the offending command.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let span = self.span().unwrap_or_else(Span::dummy);
        let diag = Diagnostic::error(self.headline(), span);
        match self {
            TranslateError::InvalidSegment { .. } => diag.with_help(
                "segments are: local, argument, this, that, constant, static, temp, pointer"
                    .to_string(),
            ),
            TranslateError::UnknownTarget(_) => {
                diag.with_help("the only supported target is 'hack'".to_string())
            }
            _ => diag,
        }
    }
}

impl std::fmt::Display for TranslateError {
    /// Formats as `unit:line: message` when the error has a location.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.unit(), self.span()) {
            (Some(unit), Some(span)) if !span.is_dummy() => {
                write!(f, "{}:{}: {}", unit, span.line, self.headline())
            }
            (Some(unit), _) => write!(f, "{}: {}", unit, self.headline()),
            _ => write!(f, "{}", self.headline()),
        }
    }
}

impl std::error::Error for TranslateError {}
