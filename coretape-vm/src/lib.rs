//! # coretape VM
//!
//! A small cooperative virtual machine executing programs encoded as
//! comma-separated signed integers on a single growable tape.
//!
//! ## Core Concepts
//! - **Tape**: linear integer memory, growing on demand; its cursor doubles as the instruction pointer
//! - **Opcodes**: ten instructions, with per-operand addressing modes packed into the instruction word
//! - **Queues**: shared FIFO handles through which engines, drivers, and controllers exchange integers
//! - **Uplink**: the suspend-on-output contract that schedules engines and controllers cooperatively
//! - **Pipeline**: an iterative driver for chains of engines; no recursion, no threads

pub mod error;
pub mod interpreter;
pub mod opcode;
pub mod pipeline;
pub mod queue;
pub mod tape;

pub use error::{Error, ErrorKind, ErrorStage, Result};
pub use interpreter::{Interpreter, OutputSink, RunState};
pub use opcode::{Modes, Opcode, ParameterMode};
pub use pipeline::Pipeline;
pub use queue::{Endpoint, IoQueue};
pub use tape::Tape;
