//! # Execution Engine
//!
//! The fetch-decode-execute loop over one tape. An engine runs until its
//! program halts, and an engine with an uplink attached additionally yields
//! after every single emitted value, so a driver can react to each output
//! before supplying the next input. Control flow stays flat: the driver's
//! loop calls `execute()` repeatedly; nothing ever calls back into the
//! driver.

use crate::error::{self, Result};
use crate::opcode::{self, Modes, Opcode, ParameterMode};
use crate::queue::{Endpoint, IoQueue};
use crate::tape::Tape;
use log::{debug, trace};
use std::io::{BufRead, Write};

/// Where emitted values go
#[derive(Debug, Clone)]
pub enum OutputSink {
    /// Append to a shared queue (uplinked and captured runs)
    Queue(IoQueue),
    /// Print each value to stdout (standalone debugging runs)
    Print,
}

/// Engine run state.
///
/// Transitions only along `Idle -> Running -> (Suspended -> Running)* ->
/// Halted`. `Suspended` exists purely for the uplink handoff: it is entered
/// right after an output instruction completes and collapses back to
/// `Running` at the top of the next `execute()` call, so no instruction is
/// ever re-executed. `Halted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started yet
    Idle,
    /// Inside the fetch-decode-execute loop
    Running,
    /// Yielded after emitting one value to an uplink
    Suspended,
    /// The program executed opcode 99; terminal
    Halted,
}

/// The virtual machine engine: one tape, one input queue, one output sink.
pub struct Interpreter {
    tape: Tape,
    relative_base: i64,
    state: RunState,
    input: IoQueue,
    output: OutputSink,
    uplinked: bool,
    last_output: Option<i64>,
    name: Option<String>,
}

impl Interpreter {
    /// Create an engine over a tape, with an empty input queue and a
    /// printing output sink
    pub fn new(tape: Tape) -> Self {
        Self {
            tape,
            relative_base: 0,
            state: RunState::Idle,
            input: IoQueue::new(),
            output: OutputSink::Print,
            uplinked: false,
            last_output: None,
            name: None,
        }
    }

    /// Create an engine directly from program text
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::new(text.parse()?))
    }

    /// Queue input values before (or between) runs
    pub fn with_inputs(self, values: impl IntoIterator<Item = i64>) -> Self {
        self.input.extend(values);
        self
    }

    /// Send emitted values to a queue instead of printing them
    pub fn with_output(mut self, queue: IoQueue) -> Self {
        self.output = OutputSink::Queue(queue);
        self
    }

    /// Name the engine; the name tags its log lines
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Make `peer`'s input queue this engine's output sink.
    ///
    /// The queue is shared, not copied. From here on the engine emits
    /// exactly one value per cycle and then suspends, returning control to
    /// the caller; the peer is expected to consume that value before the
    /// next `execute()` call.
    pub fn attach_uplink(&mut self, peer: &dyn Endpoint) {
        self.output = OutputSink::Queue(peer.intake());
        self.uplinked = true;
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// True once the program has halted
    pub fn finished(&self) -> bool {
        self.state == RunState::Halted
    }

    /// The most recently emitted value, if any
    pub fn last_output(&self) -> Option<i64> {
        self.last_output
    }

    /// Handle to the engine's input queue
    pub fn input(&self) -> IoQueue {
        self.input.clone()
    }

    /// The engine's tape
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Mutable access to the tape, e.g. to patch configuration cells or to
    /// append a generated command stream before resuming
    pub fn tape_mut(&mut self) -> &mut Tape {
        &mut self.tape
    }

    /// Run the engine.
    ///
    /// Returns when the program halts, or - with an uplink attached - as
    /// soon as one value has been emitted. Each call resumes exactly where
    /// the previous one left off; calling after the program halted is a
    /// no-op. The returned value is the last emitted output (`None` if the
    /// program has not emitted anything yet).
    pub fn execute(&mut self) -> Result<Option<i64>> {
        match self.state {
            RunState::Halted => return Ok(self.last_output),
            RunState::Idle => {
                self.tape.rewind();
                self.state = RunState::Running;
                debug!("{}: starting, {} cells", self.tag(), self.tape.len());
            }
            RunState::Suspended => {
                self.state = RunState::Running;
                debug!("{}: resuming at {}", self.tag(), self.tape.position());
            }
            RunState::Running => {}
        }

        while self.state == RunState::Running {
            self.step()?;
        }

        Ok(self.last_output)
    }

    /// Fetch, decode, and execute one instruction
    fn step(&mut self) -> Result<()> {
        let position = self.tape.position();
        let word = self.tape.next();
        let (opcode, mut modes) = opcode::decode(word)
            .map_err(|e| e.with_context("position", position.to_string()))?;

        trace!("{}: {:>6} {}", self.tag(), position, opcode.mnemonic());

        match opcode {
            Opcode::Add => {
                let a = self.source(&mut modes)?;
                let b = self.source(&mut modes)?;
                let dst = self.destination(&mut modes)?;
                self.tape.write(dst, a + b)?;
            }
            Opcode::Mul => {
                let a = self.source(&mut modes)?;
                let b = self.source(&mut modes)?;
                let dst = self.destination(&mut modes)?;
                self.tape.write(dst, a * b)?;
            }
            Opcode::Input => {
                let dst = self.destination(&mut modes)?;
                let value = self.take_input()?;
                trace!("{}: read {} into [{}]", self.tag(), value, dst);
                self.tape.write(dst, value)?;
            }
            Opcode::Output => {
                let a = self.source(&mut modes)?;
                self.emit(a);
            }
            Opcode::JumpIfTrue => {
                let a = self.source(&mut modes)?;
                let b = self.source(&mut modes)?;
                if a != 0 {
                    self.tape.seek(b)?;
                }
            }
            Opcode::JumpIfFalse => {
                let a = self.source(&mut modes)?;
                let b = self.source(&mut modes)?;
                if a == 0 {
                    self.tape.seek(b)?;
                }
            }
            Opcode::LessThan => {
                let a = self.source(&mut modes)?;
                let b = self.source(&mut modes)?;
                let dst = self.destination(&mut modes)?;
                self.tape.write(dst, (a < b) as i64)?;
            }
            Opcode::Equals => {
                let a = self.source(&mut modes)?;
                let b = self.source(&mut modes)?;
                let dst = self.destination(&mut modes)?;
                self.tape.write(dst, (a == b) as i64)?;
            }
            Opcode::AdjustBase => {
                let a = self.source(&mut modes)?;
                self.relative_base += a;
                trace!("{}: relative base now {}", self.tag(), self.relative_base);
            }
            Opcode::Halt => {
                self.state = RunState::Halted;
                debug!("{}: halted, last output {:?}", self.tag(), self.last_output);
            }
        }

        Ok(())
    }

    /// Read one source operand: the raw cell, offset by the relative base in
    /// relative mode, dereferenced through the tape unless immediate
    fn source(&mut self, modes: &mut Modes) -> Result<i64> {
        let raw = self.tape.next();
        match modes.take() {
            ParameterMode::Immediate => Ok(raw),
            ParameterMode::Position => self.tape.read(raw),
            ParameterMode::Relative => self.tape.read(raw + self.relative_base),
        }
    }

    /// Read one destination operand: always an address, never dereferenced,
    /// and never immediate
    fn destination(&mut self, modes: &mut Modes) -> Result<i64> {
        let position = self.tape.position();
        let raw = self.tape.next();
        match modes.take() {
            ParameterMode::Immediate => Err(error::immediate_destination(position)),
            ParameterMode::Position => Ok(raw),
            ParameterMode::Relative => Ok(raw + self.relative_base),
        }
    }

    /// Pop one input value, falling back to the interactive prompt for
    /// standalone runs. An uplinked engine must never prompt: empty input
    /// there means the driver broke the lock-step contract.
    fn take_input(&mut self) -> Result<i64> {
        if let Some(value) = self.input.pop() {
            return Ok(value);
        }
        if self.uplinked {
            return Err(error::input_exhausted());
        }
        self.prompt()
    }

    /// Read one integer from a line-oriented stdin prompt
    fn prompt(&self) -> Result<i64> {
        print!("{}> ", self.tag());
        std::io::stdout()
            .flush()
            .map_err(|e| error::prompt_failed("cannot flush prompt").set_source(e))?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| error::prompt_failed("cannot read from stdin").set_source(e))?;
        if read == 0 {
            return Err(error::prompt_failed("stdin closed while waiting for input"));
        }

        let token = line.trim();
        token.parse::<i64>().map_err(|e| {
            error::tape_parse(token, 0)
                .at_run()
                .with_operation("interpreter::prompt")
                .set_source(e)
        })
    }

    /// Emit one value to the output sink; with an uplink attached, suspend
    /// so control returns to the caller after this single value
    fn emit(&mut self, value: i64) {
        self.last_output = Some(value);
        match &self.output {
            OutputSink::Queue(queue) => queue.push(value),
            OutputSink::Print => println!("{}", value),
        }

        if self.uplinked {
            trace!("{}: emitted {}, suspending", self.tag(), value);
            self.state = RunState::Suspended;
        }
    }

    fn tag(&self) -> &str {
        self.name.as_deref().unwrap_or("engine")
    }
}

/// An engine is an uplink target: its input queue is its intake
impl Endpoint for Interpreter {
    fn intake(&self) -> IoQueue {
        self.input.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn run_with_inputs(program: &str, inputs: &[i64]) -> (Interpreter, Vec<i64>) {
        let outputs = IoQueue::new();
        let mut engine = Interpreter::from_text(program)
            .unwrap()
            .with_inputs(inputs.iter().copied())
            .with_output(outputs.clone());
        engine.execute().unwrap();
        (engine, outputs.drain())
    }

    #[test]
    fn test_add_positional() {
        let (mut engine, _) = run_with_inputs("1,0,0,0,99", &[]);
        assert_eq!(engine.tape_mut().read(0).unwrap(), 2);
        assert!(engine.finished());
    }

    #[test]
    fn test_mul_chain() {
        let (mut engine, _) = run_with_inputs("1,9,10,3,2,3,11,0,99,30,40,50", &[]);
        assert_eq!(engine.tape_mut().read(0).unwrap(), 3500);
    }

    #[test]
    fn test_immediate_modes() {
        let (mut engine, _) = run_with_inputs("1002,4,3,4,33", &[]);
        assert_eq!(engine.tape_mut().read(4).unwrap(), 99);
    }

    #[test]
    fn test_echo() {
        let (_, outputs) = run_with_inputs("3,0,4,0,99", &[20]);
        assert_eq!(outputs, vec![20]);
    }

    #[test]
    fn test_equals_positional() {
        let (_, outputs) = run_with_inputs("3,9,8,9,10,9,4,9,99,-1,8", &[8]);
        assert_eq!(outputs, vec![1]);

        let (_, outputs) = run_with_inputs("3,9,8,9,10,9,4,9,99,-1,8", &[7]);
        assert_eq!(outputs, vec![0]);
    }

    #[test]
    fn test_equals_immediate() {
        let (_, outputs) = run_with_inputs("3,3,1108,-1,8,3,4,3,99", &[8]);
        assert_eq!(outputs, vec![1]);
    }

    #[test]
    fn test_jump_if_false_positional() {
        let (_, outputs) =
            run_with_inputs("3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9", &[0]);
        assert_eq!(outputs, vec![0]);
    }

    #[test]
    fn test_jump_if_true_immediate() {
        let (_, outputs) = run_with_inputs("3,3,1105,-1,9,1101,0,0,12,4,12,99,1", &[10]);
        assert_eq!(outputs, vec![1]);
    }

    #[test]
    fn test_compare_to_eight() {
        let program = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
                       1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,\
                       999,1105,1,46,1101,1000,1,20,4,20,1105,1,46,98,99";
        assert_eq!(run_with_inputs(program, &[7]).1, vec![999]);
        assert_eq!(run_with_inputs(program, &[8]).1, vec![1000]);
        assert_eq!(run_with_inputs(program, &[9]).1, vec![1001]);
    }

    #[test]
    fn test_relative_base_operand() {
        let (_, outputs) = run_with_inputs("3,11,9,13,2001,11,8,12,4,12,99,0,10,4", &[5]);
        assert_eq!(outputs, vec![15]);
    }

    #[test]
    fn test_quine() {
        let program = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
        let expected: Vec<i64> = program.split(',').map(|t| t.parse().unwrap()).collect();
        let (_, outputs) = run_with_inputs(program, &[]);
        assert_eq!(outputs, expected);
    }

    #[test]
    fn test_large_values() {
        let (engine, outputs) = run_with_inputs("104,1125899906842624,99", &[]);
        assert_eq!(outputs, vec![1125899906842624]);
        assert_eq!(engine.last_output(), Some(1125899906842624));
    }

    #[test]
    fn test_execute_returns_last_output() {
        let (engine, outputs) = run_with_inputs("104,1,104,2,99", &[]);
        assert_eq!(outputs, vec![1, 2]);
        assert_eq!(engine.last_output(), Some(2));
    }

    #[test]
    fn test_no_output_returns_none() {
        let (engine, outputs) = run_with_inputs("1,0,0,0,99", &[]);
        assert!(outputs.is_empty());
        assert_eq!(engine.last_output(), None);
    }

    #[test]
    fn test_suspend_contract() {
        let controller = IoQueue::new();
        let mut engine = Interpreter::from_text("104,1,104,2,99").unwrap();
        engine.attach_uplink(&controller);

        assert_eq!(engine.execute().unwrap(), Some(1));
        assert_eq!(engine.state(), RunState::Suspended);
        assert_eq!(controller.drain(), vec![1]);

        // resumes at the next instruction: the first value is not re-emitted
        assert_eq!(engine.execute().unwrap(), Some(2));
        assert_eq!(controller.drain(), vec![2]);

        assert_eq!(engine.execute().unwrap(), Some(2));
        assert!(engine.finished());
    }

    #[test]
    fn test_halt_is_idempotent() {
        let (mut engine, _) = run_with_inputs("104,7,99", &[]);
        assert!(engine.finished());
        let snapshot = engine.tape().to_string();

        for _ in 0..3 {
            assert_eq!(engine.execute().unwrap(), Some(7));
        }
        assert_eq!(engine.tape().to_string(), snapshot);
    }

    #[test]
    fn test_negative_address_is_fatal() {
        // OUT through position mode dereferences address -1
        let mut engine = Interpreter::from_text("4,-1,99")
            .unwrap()
            .with_output(IoQueue::new());
        let err = engine.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AddressNegative);
    }

    #[test]
    fn test_unknown_opcode_is_fatal() {
        let mut engine = Interpreter::from_text("77,0,0").unwrap();
        let err = engine.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpcodeUnknown);
        assert!(err.context().iter().any(|(k, v)| *k == "position" && v == "0"));
    }

    #[test]
    fn test_immediate_destination_is_fatal() {
        let mut engine = Interpreter::from_text("11101,1,1,0,99").unwrap();
        let err = engine.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperandInvalid);
    }

    #[test]
    fn test_uplinked_engine_never_prompts() {
        let controller = IoQueue::new();
        let mut engine = Interpreter::from_text("3,0,99").unwrap();
        engine.attach_uplink(&controller);

        let err = engine.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputExhausted);
    }

    #[test]
    fn test_input_pushed_between_cycles() {
        // read one value, double it, emit, halt
        let controller = IoQueue::new();
        let mut engine = Interpreter::from_text("3,9,1002,9,2,9,4,9,99,0").unwrap();
        engine.attach_uplink(&controller);
        engine.input().push(21);

        assert_eq!(engine.execute().unwrap(), Some(42));
        assert_eq!(engine.state(), RunState::Suspended);
        assert_eq!(controller.drain(), vec![42]);

        engine.execute().unwrap();
        assert!(engine.finished());
    }

    #[test]
    fn test_state_transitions() {
        let mut engine = Interpreter::from_text("99").unwrap();
        assert_eq!(engine.state(), RunState::Idle);
        engine.execute().unwrap();
        assert_eq!(engine.state(), RunState::Halted);
    }

    #[test]
    fn test_patched_program() {
        let mut tape: Tape = "1,0,0,0,99".parse().unwrap();
        tape.patch(4, 4);
        let mut engine = Interpreter::new(tape);
        engine.execute().unwrap();
        assert_eq!(engine.tape_mut().read(0).unwrap(), 198);
    }
}
