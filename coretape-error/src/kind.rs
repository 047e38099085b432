//! Error kinds for coretape operations

use std::fmt;

/// The kind of error that occurred.
///
/// This enum categorizes errors to help users write clear error handling logic.
/// Users can match on ErrorKind to decide how to handle specific error cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration or parameters
    ConfigInvalid,

    // =========================================================================
    // Program loading errors
    // =========================================================================
    /// A token in the program text is not a signed decimal integer
    ParseFailed,

    /// Reading the program file (or the interactive prompt) failed
    IoFailed,

    // =========================================================================
    // Tape errors
    // =========================================================================
    /// A read, write, or seek computed a negative tape address
    AddressNegative,

    // =========================================================================
    // Instruction decoding errors
    // =========================================================================
    /// The fetched instruction word does not decode to a known opcode
    OpcodeUnknown,

    /// An operand is invalid for its role (e.g. an immediate-mode destination)
    OperandInvalid,

    // =========================================================================
    // Input errors
    // =========================================================================
    /// An uplinked engine hit an input instruction with an empty queue
    InputExhausted,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            // General
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::ConfigInvalid => "ConfigInvalid",

            // Loading
            ErrorKind::ParseFailed => "ParseFailed",
            ErrorKind::IoFailed => "IoFailed",

            // Tape
            ErrorKind::AddressNegative => "AddressNegative",

            // Decoding
            ErrorKind::OpcodeUnknown => "OpcodeUnknown",
            ErrorKind::OperandInvalid => "OperandInvalid",

            // Input
            ErrorKind::InputExhausted => "InputExhausted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
