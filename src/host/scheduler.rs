//! Frame scheduling - the `requestAnimationFrame` primitive.
//!
//! [`FrameScheduler`] is what animated components need from the host:
//! "run this before the next frame" plus cancellation. [`FrameLoop`] is a
//! pumped implementation stamped by a [`Clock`]; a browser host would wrap
//! `requestAnimationFrame`/`cancelAnimationFrame` instead.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tracing::trace;

use super::clock::Clock;

/// Handle returned by [`FrameScheduler::request_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Callback run on the next frame with the frame timestamp (ms).
pub type FrameCallback = Box<dyn FnOnce(f64)>;

pub trait FrameScheduler {
    /// Schedule `callback` for the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancel a pending request. Returns false if it already ran or was unknown.
    fn cancel_frame(&self, handle: FrameHandle) -> bool;
}

// =============================================================================
// FRAME LOOP
// =============================================================================

/// Frame queue driven by explicit [`pump`](Self::pump) calls.
///
/// Callbacks requested while a frame is running wait for the next pump,
/// the same way `requestAnimationFrame` inside a frame targets the next one.
pub struct FrameLoop {
    clock: Rc<dyn Clock>,
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    next_handle: Cell<u64>,
    frame_count: Cell<u64>,
}

impl FrameLoop {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: RefCell::new(Vec::new()),
            next_handle: Cell::new(0),
            frame_count: Cell::new(0),
        }
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Frames pumped so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    /// Run one frame: every callback requested before this call, stamped with `clock.now()`.
    ///
    /// Returns the number of callbacks run.
    pub fn pump(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        if batch.is_empty() {
            return 0;
        }

        let now = self.clock.now();
        let frame = self.frame_count.get();
        self.frame_count.set(frame + 1);
        trace!(frame, now, callbacks = batch.len(), "frame");

        let count = batch.len();
        for (_, callback) in batch {
            callback(now);
        }
        count
    }

    /// Pump frames every `interval` until nothing is pending or `max_frames` ran.
    ///
    /// Blocks the current thread. Returns the number of frames pumped.
    pub fn run(&self, interval: Duration, max_frames: Option<u64>) -> u64 {
        let mut frames = 0;
        while !self.is_idle() {
            if max_frames.is_some_and(|max| frames >= max) {
                break;
            }
            thread::sleep(interval);
            self.pump();
            frames += 1;
        }
        frames
    }
}

impl FrameScheduler for FrameLoop {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.pending.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) -> bool {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|(h, _)| *h != handle);
        pending.len() != before
    }
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("pending", &self.pending())
            .field("frame_count", &self.frame_count.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::clock::ManualClock;

    fn setup() -> (Rc<ManualClock>, Rc<FrameLoop>) {
        let clock = Rc::new(ManualClock::new());
        let frames = Rc::new(FrameLoop::new(clock.clone()));
        (clock, frames)
    }

    #[test]
    fn test_pump_runs_with_clock_time() {
        let (clock, frames) = setup();
        let seen = Rc::new(Cell::new(-1.0));
        let seen_clone = seen.clone();

        frames.request_frame(Box::new(move |t| seen_clone.set(t)));
        clock.set(16.0);
        assert_eq!(frames.pump(), 1);
        assert_eq!(seen.get(), 16.0);
        assert!(frames.is_idle());
    }

    #[test]
    fn test_cancel_frame() {
        let (_clock, frames) = setup();
        let ran = Rc::new(Cell::new(false));
        let ran_clone = ran.clone();

        let handle = frames.request_frame(Box::new(move |_| ran_clone.set(true)));
        assert!(frames.cancel_frame(handle));
        assert!(!frames.cancel_frame(handle));
        frames.pump();
        assert!(!ran.get());
    }

    #[test]
    fn test_requests_inside_frame_wait_for_next_pump() {
        let (_clock, frames) = setup();
        let count = Rc::new(Cell::new(0));

        let frames_clone = frames.clone();
        let count_clone = count.clone();
        frames.request_frame(Box::new(move |_| {
            let count = count_clone.clone();
            frames_clone.request_frame(Box::new(move |_| count.set(count.get() + 1)));
        }));

        frames.pump();
        assert_eq!(count.get(), 0);
        assert_eq!(frames.pending(), 1);
        frames.pump();
        assert_eq!(count.get(), 1);
        assert_eq!(frames.frame_count(), 2);
    }

    #[test]
    fn test_run_until_idle() {
        let (_clock, frames) = setup();
        frames.request_frame(Box::new(|_| {}));
        assert_eq!(frames.run(Duration::from_millis(0), None), 1);
        assert_eq!(frames.run(Duration::from_millis(0), None), 0);
    }
}
