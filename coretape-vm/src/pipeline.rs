//! # Pipeline
//!
//! An iterative driver for chains of engines. Stages are wired output to
//! input through shared queues, optionally closed into a feedback ring, and
//! driven by one flat round-robin loop. This replaces the older pattern of
//! engines invoking their consumers directly, which grew the call stack
//! without bound once more than a couple of components were chained; here
//! the queues are the only channel between stages and nothing ever calls
//! back into anything.
//!
//! The lock-step contract applies across the whole chain: each stage emits
//! one value, yields, and finds its next input already queued when the loop
//! comes back around. A stage that tries to consume more values per cycle
//! than its upstream emits dies with `InputExhausted`.

use crate::error::{self, Result};
use crate::interpreter::Interpreter;
use crate::queue::IoQueue;
use log::debug;

/// A chain of engines driven in lock-step
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Interpreter>,
    collector: IoQueue,
    feedback: bool,
    wired: bool,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the ring: the last stage's output feeds the first stage's input
    /// instead of the collector
    pub fn with_feedback(mut self) -> Self {
        self.feedback = true;
        self
    }

    /// Append a stage at the end of the chain
    pub fn push(&mut self, stage: Interpreter) {
        self.stages.push(stage);
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Queue values into the first stage's input
    pub fn seed(&self, values: impl IntoIterator<Item = i64>) -> Result<()> {
        let first = self.stages.first().ok_or_else(|| {
            error::Error::new(error::ErrorKind::ConfigInvalid, "pipeline has no stages")
                .with_operation("pipeline::seed")
        })?;
        first.input().extend(values);
        Ok(())
    }

    /// Handle to the terminal output queue.
    ///
    /// Collects everything the last stage emits; stays empty in feedback
    /// mode, where the last stage feeds the first instead.
    pub fn collector(&self) -> IoQueue {
        self.collector.clone()
    }

    /// Drive every stage round-robin until all have halted.
    ///
    /// Returns the last value emitted by the final stage. Stage errors
    /// propagate immediately and abort the whole run.
    pub fn run(&mut self) -> Result<Option<i64>> {
        if self.stages.is_empty() {
            return Ok(None);
        }

        self.wire();
        debug!(
            "pipeline: driving {} stages, feedback={}",
            self.stages.len(),
            self.feedback
        );

        while self.stages.iter().any(|s| !s.finished()) {
            for stage in &mut self.stages {
                if !stage.finished() {
                    stage.execute()?;
                }
            }
        }

        Ok(self.stages.last().and_then(|s| s.last_output()))
    }

    /// Attach each stage's uplink: stage N feeds stage N+1, and the last
    /// stage feeds the first (feedback) or the collector (serial)
    fn wire(&mut self) {
        if self.wired {
            return;
        }

        let intakes: Vec<IoQueue> = self.stages.iter().map(|s| s.input()).collect();
        let count = self.stages.len();
        for (i, stage) in self.stages.iter_mut().enumerate() {
            if i + 1 < count {
                stage.attach_uplink(&intakes[i + 1]);
            } else if self.feedback {
                stage.attach_uplink(&intakes[0]);
            } else {
                stage.attach_uplink(&self.collector);
            }
        }
        self.wired = true;
    }
}
