//! # I/O Queues
//!
//! Engines and their drivers exchange integers through shared FIFO queues.
//! An `IoQueue` is a cheap clonable handle; clones refer to the same
//! underlying queue, which is what makes "engine A's output sink IS engine
//! B's input queue" expressible without copying values around. Execution is
//! single-threaded and cooperative, so `Rc<RefCell<..>>` suffices: the two
//! parties sharing a queue alternate under the one-value-then-yield
//! contract, never concurrently.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Clonable handle to one shared FIFO of integers
#[derive(Debug, Clone, Default)]
pub struct IoQueue {
    inner: Rc<RefCell<VecDeque<i64>>>,
}

impl IoQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue pre-seeded with values
    pub fn from_values(values: impl IntoIterator<Item = i64>) -> Self {
        let queue = Self::new();
        queue.extend(values);
        queue
    }

    /// Append a value at the back
    pub fn push(&self, value: i64) {
        self.inner.borrow_mut().push_back(value);
    }

    /// Remove and return the front value, if any
    pub fn pop(&self) -> Option<i64> {
        self.inner.borrow_mut().pop_front()
    }

    /// Number of queued values
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Check if no values are queued
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Append several values at the back
    pub fn extend(&self, values: impl IntoIterator<Item = i64>) {
        self.inner.borrow_mut().extend(values);
    }

    /// Remove and return all queued values, front first
    pub fn drain(&self) -> Vec<i64> {
        self.inner.borrow_mut().drain(..).collect()
    }

    /// Check whether two handles refer to the same underlying queue
    pub fn shares_with(&self, other: &IoQueue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Anything that accepts an integer queue as its input.
///
/// Implemented by engines and by domain controllers alike, so an uplink can
/// target either without the attaching side caring which it got.
pub trait Endpoint {
    /// A handle to the queue this endpoint consumes from
    fn intake(&self) -> IoQueue;
}

/// A bare queue is its own endpoint
impl Endpoint for IoQueue {
    fn intake(&self) -> IoQueue {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = IoQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_clone_shares_identity() {
        let a = IoQueue::new();
        let b = a.clone();
        a.push(7);

        assert_eq!(b.pop(), Some(7));
        assert!(a.shares_with(&b));
        assert!(!a.shares_with(&IoQueue::new()));
    }

    #[test]
    fn test_from_values_and_drain() {
        let queue = IoQueue::from_values([4, 5, 6]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain(), vec![4, 5, 6]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_is_an_endpoint() {
        let queue = IoQueue::new();
        let intake = queue.intake();
        intake.push(9);
        assert_eq!(queue.pop(), Some(9));
        assert!(queue.shares_with(&intake));
    }
}
