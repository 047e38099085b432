//! The main Error type for coretape

use crate::{ErrorKind, ErrorStage};
use std::fmt;

/// The unified error type for all coretape operations.
///
/// This error type provides:
/// - `kind`: What type of error occurred
/// - `message`: Human-readable description
/// - `stage`: Whether the program failed to load or died mid-run
/// - `operation`: What operation caused the error
/// - `context`: Key-value pairs for debugging
/// - `source`: The underlying error (if any)
///
/// # Example
///
/// ```rust
/// use coretape_error::{Error, ErrorKind, ErrorStage};
///
/// let err = Error::new(ErrorKind::OpcodeUnknown, "instruction word does not decode")
///     .with_operation("interpreter::step")
///     .with_context("word", "42")
///     .with_context("position", "17");
///
/// assert_eq!(err.kind(), ErrorKind::OpcodeUnknown);
/// assert!(err.stage().is_run());
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    stage: ErrorStage,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new error with the given kind and message.
    ///
    /// The stage defaults per kind: parse and file errors are load-stage,
    /// everything else is run-stage. Override with `at_load()` / `at_run()`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let stage = match kind {
            ErrorKind::ParseFailed | ErrorKind::IoFailed | ErrorKind::ConfigInvalid => {
                ErrorStage::Load
            }
            _ => ErrorStage::Run,
        };

        Self {
            kind,
            message: message.into(),
            stage,
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error stage
    pub fn stage(&self) -> ErrorStage {
        self.stage
    }

    /// Get the operation that caused this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Get the source error (if any)
    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Set the error stage
    pub fn with_stage(mut self, stage: ErrorStage) -> Self {
        self.stage = stage;
        self
    }

    /// Mark as raised during program loading
    pub fn at_load(mut self) -> Self {
        self.stage = ErrorStage::Load;
        self
    }

    /// Mark as raised mid-run
    pub fn at_run(mut self) -> Self {
        self.stage = ErrorStage::Run;
        self
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }
}

// =============================================================================
// Display - compact, single-line format for logs
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.kind, self.stage, self.operation)?;

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}) at {}", self.kind, self.stage, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// =============================================================================
// Convenient From implementations (be careful not to leak raw errors!)
// =============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::IoFailed, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

// =============================================================================
// Convenience constructors
// =============================================================================

impl Error {
    /// Create an Unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create a ParseFailed error
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    /// Create an IoFailed error
    pub fn io_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoFailed, message)
    }

    /// Create an AddressNegative error
    pub fn address_negative(address: i64) -> Self {
        Self::new(
            ErrorKind::AddressNegative,
            format!("tape address {} is negative", address),
        )
        .with_context("address", address.to_string())
    }

    /// Create an OpcodeUnknown error
    pub fn opcode_unknown(word: i64) -> Self {
        Self::new(
            ErrorKind::OpcodeUnknown,
            format!("instruction word {} does not decode", word),
        )
        .with_context("word", word.to_string())
    }

    /// Create an OperandInvalid error
    pub fn operand_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperandInvalid, message)
    }

    /// Create an InputExhausted error
    pub fn input_exhausted() -> Self {
        Self::new(
            ErrorKind::InputExhausted,
            "input queue is empty and an uplink is attached",
        )
    }
}
