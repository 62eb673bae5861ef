//! Frame-level progress reporting to stderr.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::Display;

/// Stage of the stacking pipeline, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StackingStage {
    /// Reading and decoding input files.
    Loading,
    /// Star and constellation extraction per frame.
    Extracting,
    /// Summing aligned frames.
    Summing,
}

/// Atomic step counter writing `stage: current/total` lines to stderr.
#[derive(Debug)]
pub struct Progress {
    stage: StackingStage,
    current: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(stage: StackingStage, total: usize) -> Self {
        Self {
            stage,
            current: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one completed step and rewrite the progress line.
    pub fn step(&self) {
        let done = self.current.fetch_add(1, Ordering::Relaxed) + 1;
        eprint!("\r{}: {}/{}", self.stage, done, self.total);
        let _ = io::stderr().flush();
    }

    /// Terminate the progress line.
    pub fn finish(&self) {
        eprintln!();
    }

    pub fn completed(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}
