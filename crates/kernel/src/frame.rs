use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Wall-clock time since the loop started and since the previous frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Advance to now and return the time since the previous call.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last;
        self.last = now;
        delta
    }
}

/// Shared flag that ends the frame loop. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-frame timing handed to the update step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// 1-based frame number.
    pub frame: u64,
    pub elapsed: Duration,
    pub delta: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameControl {
    Continue(FrameInfo),
    Stop,
}

/// Counts frames and decides whether another one should run.
#[derive(Debug, Default)]
pub struct FrameLoop {
    clock: FrameClock,
    frame: u64,
    stop: StopHandle,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn tick(&mut self) -> FrameControl {
        if self.stop.is_stopped() {
            return FrameControl::Stop;
        }
        self.frame += 1;
        let delta = self.clock.lap();
        FrameControl::Continue(FrameInfo {
            frame: self.frame,
            elapsed: self.clock.elapsed(),
            delta,
        })
    }
}
