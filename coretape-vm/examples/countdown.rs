//! # Countdown Demo
//!
//! Runs a small tape program standalone, capturing its outputs in a queue.

use coretape_vm::{Interpreter, IoQueue};

fn main() -> coretape_vm::Result<()> {
    // stores 5, then emits and decrements until it reaches zero
    let program = "1101,5,0,14,4,14,101,-1,14,14,1005,14,4,99";

    let outputs = IoQueue::new();
    let mut engine = Interpreter::from_text(program)?
        .with_output(outputs.clone())
        .named("countdown");

    engine.execute()?;

    println!("emitted: {:?}", outputs.drain());
    println!("last output: {:?}", engine.last_output());
    Ok(())
}
