//! Host seams — clock, tick scheduling and render output
//!
//! The engine never reads wall time or schedules callbacks itself. A host
//! (UI event loop, headless runner, test) provides these.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use cf_stage::{SpinEventKind, SpinPhase, SpinTrace};
use serde::{Deserialize, Serialize};

use crate::resolver::SpinOutcome;
use crate::sequence::ReelSequence;

/// Millisecond time source
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// When the next tick should fire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Wake {
    /// On the next display refresh
    NextFrame,
    /// After a delay in milliseconds
    After(f64),
}

/// Schedules the next driver tick
pub trait TickScheduler {
    fn request_tick(&mut self, wake: Wake);

    /// Drop requests that have not fired yet. Returns false when the host
    /// cannot take a request back, in which case the queued wake still fires.
    fn cancel_pending(&mut self) -> bool {
        false
    }
}

/// One rendered animation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelFrame {
    /// Reel translation in pixels
    pub offset: f64,
    /// Linear time progress
    pub progress: f64,
    /// Distance progress after easing
    pub eased: f64,
    /// Entry inside the highlight zone
    pub highlighted: Option<usize>,
}

/// Receives everything the UI layer needs to draw
pub trait RenderSink {
    /// Lay out a new reel
    fn sequence_built(&mut self, sequence: &ReelSequence, now_ms: f64);

    /// Move the reel
    fn frame(&mut self, frame: &ReelFrame, now_ms: f64);

    fn phase_changed(&mut self, _from: SpinPhase, _to: SpinPhase, _now_ms: f64) {}

    fn settled(&mut self, _centered: Option<usize>, _now_ms: f64) {}

    fn resolved(&mut self, _outcome: &SpinOutcome, _now_ms: f64) {}

    fn abandoned(&mut self, _now_ms: f64) {}
}

/// Discards all output
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn sequence_built(&mut self, _sequence: &ReelSequence, _now_ms: f64) {}

    fn frame(&mut self, _frame: &ReelFrame, _now_ms: f64) {}
}

impl RenderSink for SpinTrace {
    fn sequence_built(&mut self, sequence: &ReelSequence, now_ms: f64) {
        self.record(
            SpinEventKind::SequenceBuilt {
                len: sequence.len(),
                winning_index: sequence.winning_index(),
            },
            now_ms,
        );
    }

    fn frame(&mut self, frame: &ReelFrame, now_ms: f64) {
        self.record(
            SpinEventKind::Frame {
                offset: frame.offset,
                progress: frame.progress,
                highlighted: frame.highlighted,
            },
            now_ms,
        );
    }

    fn phase_changed(&mut self, from: SpinPhase, to: SpinPhase, now_ms: f64) {
        self.record(SpinEventKind::PhaseChanged { from, to }, now_ms);
    }

    fn settled(&mut self, centered: Option<usize>, now_ms: f64) {
        self.record(SpinEventKind::Settled { centered }, now_ms);
    }

    fn resolved(&mut self, outcome: &SpinOutcome, now_ms: f64) {
        self.record(
            SpinEventKind::Resolved {
                index: outcome.resolution.index(),
                item: outcome.item.name().to_string(),
                fallback: outcome.resolution.is_fallback(),
            },
            now_ms,
        );
    }

    fn abandoned(&mut self, now_ms: f64) {
        self.record(SpinEventKind::Abandoned, now_ms);
    }
}

/// Wall clock relative to construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: f64) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug, Default)]
struct TickQueue {
    pending: VecDeque<Wake>,
    requested: u64,
}

/// Records tick requests for a host loop to replay; clones share the queue
#[derive(Debug, Clone, Default)]
pub struct QueuedScheduler {
    queue: Rc<RefCell<TickQueue>>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest pending request
    pub fn take_next(&self) -> Option<Wake> {
        self.queue.borrow_mut().pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Total requests ever made
    pub fn requested(&self) -> u64 {
        self.queue.borrow().requested
    }

    pub fn clear(&self) {
        self.queue.borrow_mut().pending.clear();
    }
}

impl TickScheduler for QueuedScheduler {
    fn request_tick(&mut self, wake: Wake) {
        let mut queue = self.queue.borrow_mut();
        queue.pending.push_back(wake);
        queue.requested += 1;
    }

    fn cancel_pending(&mut self) -> bool {
        self.clear();
        true
    }
}
