//! Host context passed to every component constructor.

use std::fmt;
use std::rc::Rc;

use super::clock::{Clock, ManualClock};
use super::scheduler::{FrameLoop, FrameScheduler};
use super::viewport::Viewport;

/// The host services a component may use. Cloning shares them.
#[derive(Clone)]
pub struct Context {
    pub viewport: Viewport,
    /// Host time for consumers, e.g. stamping input events. Frame callbacks
    /// get the scheduler's own timestamp; timelines integrate that, not this.
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn FrameScheduler>,
}

impl Context {
    pub fn new(viewport: Viewport, clock: Rc<dyn Clock>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            viewport,
            clock,
            scheduler,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// A fully manual host: time moves on `clock.set`, frames run on `frames.pump()`.
#[derive(Debug, Clone)]
pub struct Headless {
    pub clock: Rc<ManualClock>,
    pub frames: Rc<FrameLoop>,
    pub viewport: Viewport,
}

impl Headless {
    /// 1920x1080 desktop viewport, clock at 0.
    pub fn new() -> Self {
        let clock = Rc::new(ManualClock::new());
        let frames = Rc::new(FrameLoop::new(clock.clone()));
        Self {
            clock,
            frames,
            viewport: Viewport::default(),
        }
    }

    pub fn context(&self) -> Context {
        Context::new(self.viewport.clone(), self.clock.clone(), self.frames.clone())
    }

    /// Set the clock to `ms` and run one frame.
    pub fn frame_at(&self, ms: f64) -> usize {
        self.clock.set(ms);
        self.frames.pump()
    }
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_frame_time_matches_context_clock() {
        let host = Headless::new();
        let ctx = host.context();
        let seen = Rc::new(Cell::new(-1.0));
        let seen_clone = seen.clone();

        ctx.scheduler.request_frame(Box::new(move |t| seen_clone.set(t)));
        assert_eq!(host.frame_at(250.0), 1);

        assert_eq!(seen.get(), 250.0);
        assert_eq!(ctx.clock.now(), 250.0);
    }
}
