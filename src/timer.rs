//! Monotonic stopwatch shared by every query executor.

use std::time::Instant;

use crate::error::{GeodexError, Result};

/// A start/stop stopwatch over [`Instant`].
///
/// Misuse (double start, stop without start, reading the elapsed time before
/// a matched stop) is a programming error and is reported as
/// [`GeodexError::TimerState`] instead of producing a silently wrong value.
#[derive(Debug, Default)]
pub struct QueryTimer {
    started: Option<Instant>,
    elapsed_millis: Option<f64>,
}

impl QueryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the start timestamp. Fails if the timer is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.started.is_some() {
            return Err(GeodexError::TimerState("start() called twice without stop()"));
        }
        self.started = Some(Instant::now());
        self.elapsed_millis = None;
        Ok(())
    }

    /// Fix the elapsed duration. Fails if the timer was never started.
    pub fn stop(&mut self) -> Result<()> {
        let started = self
            .started
            .take()
            .ok_or(GeodexError::TimerState("stop() called without start()"))?;
        self.elapsed_millis = Some(started.elapsed().as_secs_f64() * 1_000.0);
        Ok(())
    }

    /// Elapsed milliseconds of the last matched start/stop pair, with
    /// sub-millisecond resolution.
    pub fn elapsed_millis(&self) -> Result<f64> {
        self.elapsed_millis
            .ok_or(GeodexError::TimerState("elapsed read before stop()"))
    }
}
