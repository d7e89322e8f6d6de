//! Frame clock abstraction.
//!
//! A [`FrameClock`] is the "request next frame" primitive the scheduler
//! subscribes to. In the browser this is `requestAnimationFrame`
//! (see `web::RafClock`); on the host, [`ManualClock`] lets callers step
//! frames deterministically.

use std::cell::{Cell, RefCell};
use thiserror::Error;

/// Handle returned by [`FrameClock::request_frame`], used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub i32);

/// One-shot callback receiving the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("no window available to schedule frames")]
    NoWindow,
    #[error("frame request rejected: {0}")]
    Rejected(String),
}

pub trait FrameClock {
    /// Current high-resolution time in milliseconds, on the same timebase as
    /// the timestamps passed to frame callbacks.
    fn now(&self) -> f64;

    /// Schedule `on_frame` to run once on the next frame. Must not invoke it
    /// synchronously.
    fn request_frame(&self, on_frame: FrameCallback) -> Result<FrameRequestId, ClockError>;

    /// Cancel a pending request. Unknown or already-fired ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}

/// Deterministic clock for headless hosts and tests.
///
/// Frames only fire when [`fire_frame`](Self::fire_frame) is called.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<f64>,
    next_id: Cell<i32>,
    total_requests: Cell<usize>,
    pending: RefCell<Vec<(FrameRequestId, FrameCallback)>>,
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &self.now.get())
            .field("pending", &self.pending.borrow().len())
            .field("total_requests", &self.total_requests.get())
            .finish()
    }
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        let clock = Self::default();
        clock.now.set(start_ms);
        clock
    }

    pub fn set_now(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Number of frame requests currently outstanding.
    pub fn pending_requests(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of frame requests made over the clock's lifetime.
    pub fn total_requests(&self) -> usize {
        self.total_requests.get()
    }

    /// Sets the clock to `timestamp_ms` and fires every request pending at
    /// that moment. Requests made while firing wait for the next call.
    /// Returns how many callbacks ran.
    pub fn fire_frame(&self, timestamp_ms: f64) -> usize {
        self.now.set(timestamp_ms);
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let fired = due.len();
        for (_, on_frame) in due {
            on_frame(timestamp_ms);
        }
        fired
    }

    /// Advances by `step_ms` and fires the frame at the new time.
    pub fn step(&self, step_ms: f64) -> usize {
        self.fire_frame(self.now.get() + step_ms)
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn request_frame(&self, on_frame: FrameCallback) -> Result<FrameRequestId, ClockError> {
        let id = FrameRequestId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        self.total_requests.set(self.total_requests.get() + 1);
        self.pending.borrow_mut().push((id, on_frame));
        Ok(id)
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        // Bind the removed callbacks so they drop after the borrow ends.
        let cancelled: Vec<_> = {
            let mut pending = self.pending.borrow_mut();
            let (cancelled, kept) = std::mem::take(&mut *pending)
                .into_iter()
                .partition(|(pid, _)| *pid == id);
            *pending = kept;
            cancelled
        };
        drop(cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn fire_frame_runs_pending_once() {
        let clock = ManualClock::new(0.0);
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        clock
            .request_frame(Box::new(move |ts| s.set(ts)))
            .unwrap();
        assert_eq!(clock.pending_requests(), 1);
        assert_eq!(clock.fire_frame(16.0), 1);
        assert_eq!(seen.get(), 16.0);
        assert_eq!(clock.fire_frame(32.0), 0);
    }

    #[test]
    fn cancel_drops_only_matching_request() {
        let clock = ManualClock::new(0.0);
        let a = clock.request_frame(Box::new(|_| {})).unwrap();
        let _b = clock.request_frame(Box::new(|_| {})).unwrap();
        clock.cancel_frame(a);
        assert_eq!(clock.pending_requests(), 1);
        clock.cancel_frame(a);
        assert_eq!(clock.pending_requests(), 1);
        assert_eq!(clock.total_requests(), 2);
    }
}
