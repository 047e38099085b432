//! Error stages for coretape operations

use std::fmt;

/// The stage at which an error was raised.
///
/// The engine never retries: every error is fatal to its run. What callers
/// actually branch on is whether a program failed before any instruction
/// executed (malformed text, unreadable file) or died mid-run (bad address,
/// undecodable instruction). Load errors leave the tape untouched; run
/// errors leave it in whatever state the program reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStage {
    /// Raised while loading or parsing a program, before execution started
    Load,
    /// Raised by the fetch-decode-execute loop mid-run
    Run,
}

impl ErrorStage {
    /// Returns the stage as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStage::Load => "load",
            ErrorStage::Run => "run",
        }
    }

    /// True if the error was raised before any instruction executed
    pub fn is_load(&self) -> bool {
        matches!(self, ErrorStage::Load)
    }

    /// True if the error was raised mid-run
    pub fn is_run(&self) -> bool {
        matches!(self, ErrorStage::Run)
    }
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
