//! # Amplifier Chain Demo
//!
//! Chains several engines output-to-input and drives them with the
//! pipeline's flat round-robin loop - the same program text runs in every
//! stage, each one transforming the value it receives from the previous
//! stage.

use coretape_vm::{Interpreter, Pipeline};

fn main() -> coretape_vm::Result<()> {
    // each stage reads one value, adds one, emits it, and halts
    let stage_program = "3,9,101,1,9,9,4,9,99,0";

    let mut pipeline = Pipeline::new();
    for i in 0..4 {
        pipeline.push(
            Interpreter::from_text(stage_program)?.named(format!("amp-{}", i)),
        );
    }
    pipeline.seed([10])?;

    let result = pipeline.run()?;
    println!("chain of 4 incrementers fed 10 -> {:?}", result);

    // a ring: one engine consuming its own output until a threshold
    let counter = "3,17,1001,17,1,17,4,17,1007,17,5,18,1005,18,0,99,0,0,0";
    let mut ring = Pipeline::new().with_feedback();
    ring.push(Interpreter::from_text(counter)?.named("counter"));
    ring.seed([0])?;

    println!("feedback counter -> {:?}", ring.run()?);
    Ok(())
}
