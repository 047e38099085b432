//! # coretape-error
//!
//! Unified error handling for coretape - the cooperative tape virtual machine.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., AddressNegative, OpcodeUnknown)
//! - **ErrorStage**: Know when it occurred (while loading a program, or mid-run)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use coretape_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::AddressNegative, "tape address is negative")
//!         .with_operation("tape::read")
//!         .with_context("address", "-1"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible functions return `Result<T, coretape_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage
//! - Every engine fault is fatal: nothing is retried or downgraded

mod error;
mod kind;
mod stage;

pub use error::Error;
pub use kind::ErrorKind;
pub use stage::ErrorStage;

/// Result type alias using coretape Error
pub type Result<T> = std::result::Result<T, Error>;
