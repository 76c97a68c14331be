//! A single-threaded deferred work queue.
//!
//! Closures run against the tree at a caller-chosen drain point, after the
//! current mutation has fully unwound. Jobs with the same due time run in
//! submission order.

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    time::{Duration, Instant},
};

use crate::tree::Tree;

type Job = Box<dyn FnOnce(&mut Tree)>;

struct Entry {
    /// When the job becomes runnable.
    due: Instant,
    /// Submission counter, breaking ties FIFO.
    seq: u64,
    /// The queued closure.
    job: Job,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the earliest entry surfaces first in a max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A queue of closures to run against the tree, each with an optional delay.
pub struct DeferredQueue {
    /// Pending jobs ordered by due time then submission order.
    heap: BinaryHeap<Entry>,
    /// Next submission counter value.
    next_seq: u64,
}

impl Default for DeferredQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredQueue {
    /// Construct an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue a job to run at the next drain.
    pub fn push(&mut self, f: impl FnOnce(&mut Tree) + 'static) {
        self.push_after(Duration::ZERO, f);
    }

    /// Queue a job to run once the delay has elapsed.
    pub fn push_after(&mut self, delay: Duration, f: impl FnOnce(&mut Tree) + 'static) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due: Instant::now() + delay,
            seq,
            job: Box::new(f),
        });
    }

    /// Remove and return every job whose due time has passed, in order. Jobs
    /// pushed after this call are not included, so drain loops terminate even
    /// when jobs requeue themselves.
    pub fn take_due(&mut self) -> Vec<Job> {
        let now = Instant::now();
        let mut due = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.due > now {
                break;
            }
            if let Some(entry) = self.heap.pop() {
                due.push(entry.job);
            }
        }
        due
    }

    /// Number of queued jobs, due or not.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
