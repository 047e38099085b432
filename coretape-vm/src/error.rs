//! Coretape VM error types
//!
//! Re-exports coretape-error and provides VM-specific conveniences.

// Re-export the core error types
pub use coretape_error::{Error, ErrorKind, ErrorStage, Result};

use std::path::Path;

// =============================================================================
// VM-specific error constructors
// =============================================================================

/// Create a ParseFailed error for a bad program token
pub fn tape_parse(token: &str, index: usize) -> Error {
    Error::parse_failed(format!("token '{}' is not a signed integer", token))
        .with_operation("tape::parse")
        .with_context("token", token)
        .with_context("index", index.to_string())
}

/// Create an IoFailed error for an unreadable or empty program file
pub fn program_unreadable(path: &Path) -> Error {
    Error::io_failed("program file is unreadable or empty")
        .with_operation("tape::from_file")
        .with_context("path", path.display().to_string())
}

/// Create an AddressNegative error
pub fn address_negative(address: i64) -> Error {
    Error::address_negative(address)
}

/// Create an OpcodeUnknown error for an undecodable instruction word
pub fn opcode_unknown(word: i64) -> Error {
    Error::opcode_unknown(word).with_operation("opcode::decode")
}

/// Create an OperandInvalid error for an immediate-mode destination operand
pub fn immediate_destination(position: usize) -> Error {
    Error::operand_invalid("destination operand cannot use immediate mode")
        .with_operation("interpreter::step")
        .with_context("position", position.to_string())
}

/// Create an InputExhausted error for an uplinked engine with no queued input
pub fn input_exhausted() -> Error {
    Error::input_exhausted().with_operation("interpreter::step")
}

/// Create an IoFailed error for the interactive input prompt
pub fn prompt_failed(message: impl Into<String>) -> Error {
    Error::io_failed(message).at_run().with_operation("interpreter::prompt")
}
