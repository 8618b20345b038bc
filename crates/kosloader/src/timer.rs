//! Run time measurement for log messages.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

/// A started measurement.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Elapsed {
        Elapsed(self.started.elapsed())
    }
}

/// A measured duration, displayed in seconds with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed(pub Duration);

impl Elapsed {
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

/// Awaits `future` and returns its output with the time it took.
pub async fn timed<F: Future>(future: F) -> (F::Output, Elapsed) {
    let watch = Stopwatch::start();
    let output = future.await;
    (output, watch.elapsed())
}
