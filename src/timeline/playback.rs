//! Timeline - frame-driven playback over a [`TimelineBase`].
//!
//! # State machine
//!
//! ```text
//! Idle ──play──▶ Playing ──boundary──▶ Completed
//!                 │    ▲                   │
//!            pause│    │play               │play (restarts)
//!                 ▼    │                   ▼
//!                 Paused               Playing
//! ```
//!
//! Each frame advances progress by `elapsed / duration` in the current
//! direction. The first frame of a run only records its timestamp.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::event::CallbackRegistry;
use crate::host::{Context, FrameHandle};
use crate::module::{Cascade, HasCallbacks};
use crate::types::{snap_to, Span};

use super::base::{Imitate, TimelineBase};
use super::data::{TimelineData, TimelineEvent, TimelineSettings};
use super::easing::Easing;

// =============================================================================
// OPTIONS
// =============================================================================

/// Construction options for [`Timeline`].
#[derive(Clone, Debug)]
pub struct TimelineOptions {
    pub settings: TimelineSettings,
    /// Run length in milliseconds. Zero or less completes on the first frame.
    pub duration: f64,
    /// Destroy the timeline after its first `End`.
    pub destroy_on_end: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            settings: TimelineSettings::default(),
            duration: 1000.0,
            destroy_on_end: false,
        }
    }
}

impl TimelineOptions {
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration = ms;
        self
    }

    pub fn line(mut self, line: impl Into<Span>) -> Self {
        self.settings.line = line.into();
        self
    }

    pub fn scope(mut self, scope: impl Into<Span>) -> Self {
        self.settings.scope = scope.into();
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.settings.easing = easing;
        self
    }

    pub fn destroy_on_end(mut self, destroy: bool) -> Self {
        self.destroy_on_end = destroy;
        self
    }
}

/// Per-run overrides for [`Timeline::play`].
#[derive(Clone, Debug, Default)]
pub struct PlayOptions {
    pub duration: Option<f64>,
    pub easing: Option<Easing>,
    pub scope: Option<Span>,
}

impl PlayOptions {
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn scope(mut self, scope: impl Into<Span>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.easing.is_none() && self.scope.is_none()
    }
}

// =============================================================================
// TIMELINE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayState {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Settings in effect for the current run.
#[derive(Clone, Debug)]
struct Run {
    duration: f64,
    settings: TimelineSettings,
}

struct PlaybackInner {
    base: TimelineBase,
    context: Context,
    duration: Cell<f64>,
    destroy_on_end: bool,
    run: RefCell<Run>,
    state: Cell<PlayState>,
    reversed: Cell<bool>,
    frame: Cell<Option<FrameHandle>>,
    last_tick: Cell<Option<f64>>,
}

/// Frame-driven timeline. Cheap handle; clones share state.
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<PlaybackInner>,
}

impl Timeline {
    pub fn new(context: Context, options: TimelineOptions) -> Self {
        let TimelineOptions {
            settings,
            duration,
            destroy_on_end,
        } = options;
        Self {
            inner: Rc::new(PlaybackInner {
                base: TimelineBase::new(settings.clone()),
                context,
                duration: Cell::new(duration),
                destroy_on_end,
                run: RefCell::new(Run { duration, settings }),
                state: Cell::new(PlayState::Idle),
                reversed: Cell::new(false),
                frame: Cell::new(None),
                last_tick: Cell::new(None),
            }),
        }
    }

    /// The underlying progress computation (for nesting and settings).
    pub fn base(&self) -> &TimelineBase {
        &self.inner.base
    }

    pub fn data(&self) -> TimelineData {
        self.inner.base.data()
    }

    /// Absolute progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.inner.base.progress()
    }

    pub fn duration(&self) -> f64 {
        self.inner.duration.get()
    }

    /// Default duration for later runs.
    pub fn set_duration(&self, ms: f64) {
        self.inner.duration.set(ms);
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.get() == PlayState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.get() == PlayState::Paused
    }

    pub fn is_reversed(&self) -> bool {
        self.inner.reversed.get()
    }

    pub fn is_completed(&self) -> bool {
        self.inner.state.get() == PlayState::Completed
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.base.is_destroyed()
    }

    /// Start or resume a run.
    ///
    /// Returns false (and changes nothing) when already playing forward or
    /// destroyed. While playing reversed, flips the run back to forward.
    /// A run that ended at its boundary restarts from the other end.
    pub fn play(&self, options: PlayOptions) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let inner = &self.inner;

        if inner.state.get() == PlayState::Playing {
            if !inner.reversed.get() {
                return false;
            }
            inner.reversed.set(false);
            self.apply_run(&options);
            debug!("timeline play: direction flipped to forward");
            return true;
        }

        // A paused run resumes with its own overrides unless new ones are given.
        if inner.state.get() != PlayState::Paused || !options.is_empty() {
            self.apply_run(&options);
        }

        let reversed = inner.reversed.get();
        let progress = self.progress();
        if (!reversed && progress >= 1.0) || (reversed && progress <= 0.0) {
            let restart = if reversed { 1.0 } else { 0.0 };
            let settings = inner.run.borrow().settings.clone();
            inner.base.set_silent(restart, &settings);
        }

        inner.state.set(PlayState::Playing);
        inner.last_tick.set(None);
        debug!(reversed, progress = self.progress(), "timeline play");
        inner.base.dispatch(&TimelineEvent::Start);

        // A Start callback may have paused or destroyed us.
        if self.is_playing() {
            self.request_frame();
        }
        true
    }

    /// Stop the frame loop, keeping progress. Returns false if not playing.
    pub fn pause(&self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.cancel_frame();
        self.inner.state.set(PlayState::Paused);
        self.inner.last_tick.set(None);
        debug!(progress = self.progress(), "timeline pause");
        self.inner.base.dispatch(&TimelineEvent::Pause);
        true
    }

    /// Flip direction. A running timeline continues from its current
    /// progress on the next frame. Returns the new direction.
    pub fn reverse(&self) -> bool {
        let reversed = !self.inner.reversed.get();
        self.inner.reversed.set(reversed);
        debug!(reversed, "timeline reverse");
        reversed
    }

    /// Move progress to the start of the current direction without dispatching.
    pub fn reset(&self) {
        if self.is_destroyed() {
            return;
        }
        let ratio = if self.is_reversed() { 1.0 } else { 0.0 };
        let settings = self.inner.run.borrow().settings.clone();
        self.inner.base.set_silent(ratio, &settings);
        self.inner.last_tick.set(None);
        if self.is_completed() {
            self.inner.state.set(PlayState::Idle);
        }
    }

    /// Set progress to `ratio` right away, dispatching `Progress` and
    /// driving nested timelines. Does not touch the frame loop.
    pub fn imitate(&self, ratio: f64) -> TimelineData {
        let settings = self.inner.run.borrow().settings.clone();
        self.inner.base.imitate_with(ratio, &settings)
    }

    /// Like [`imitate`](Self::imitate) with `settings` in place of the run's.
    /// Neither the run nor the stored settings change.
    pub fn imitate_with(&self, ratio: f64, settings: &TimelineSettings) -> TimelineData {
        self.inner.base.imitate_with(ratio, settings)
    }

    /// Nest `child` under this timeline's progress.
    pub fn add_timeline(&self, child: impl Imitate + 'static) -> bool {
        self.inner.base.add_timeline(child)
    }

    /// Cancel the frame loop, destroy nested timelines, dispatch `Destroy`.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.cancel_frame();
        self.inner.state.set(PlayState::Idle);
        self.inner.base.destroy();
    }

    // =========================================================================
    // FRAME LOOP
    // =========================================================================

    fn apply_run(&self, options: &PlayOptions) {
        let mut settings = self.inner.base.settings();
        if let Some(easing) = &options.easing {
            settings.easing = easing.clone();
        }
        if let Some(scope) = options.scope {
            settings.scope = scope;
        }
        *self.inner.run.borrow_mut() = Run {
            duration: options.duration.unwrap_or(self.inner.duration.get()),
            settings,
        };
    }

    fn request_frame(&self) {
        let weak: Weak<PlaybackInner> = Rc::downgrade(&self.inner);
        let handle = self.inner.context.scheduler.request_frame(Box::new(move |now| {
            if let Some(inner) = weak.upgrade() {
                Timeline { inner }.tick(now);
            }
        }));
        self.inner.frame.set(Some(handle));
    }

    fn cancel_frame(&self) {
        if let Some(handle) = self.inner.frame.take() {
            self.inner.context.scheduler.cancel_frame(handle);
        }
    }

    fn tick(&self, now: f64) {
        let inner = &self.inner;
        inner.frame.set(None);
        if !self.is_playing() {
            return;
        }

        let elapsed = inner
            .last_tick
            .replace(Some(now))
            .map_or(0.0, |last| (now - last).max(0.0));

        let run = inner.run.borrow().clone();
        let reversed = inner.reversed.get();
        let target = if reversed { 0.0 } else { 1.0 };

        let progress = if run.duration <= 0.0 {
            target
        } else {
            let step = elapsed / run.duration;
            let next = if reversed {
                self.progress() - step
            } else {
                self.progress() + step
            };
            // Snap toward the end being approached only; steps below the
            // epsilon must still move away from the start.
            snap_to(next.clamp(0.0, 1.0), target)
        };
        trace!(now, elapsed, progress, reversed, "timeline tick");

        let data = inner.base.imitate_with(progress, &run.settings);

        // Progress callbacks may pause, reverse or destroy.
        if !self.is_playing() {
            return;
        }
        let at_end = if inner.reversed.get() {
            data.progress <= 0.0
        } else {
            data.progress >= 1.0
        };
        if !at_end {
            self.request_frame();
            return;
        }

        inner.state.set(PlayState::Completed);
        inner.last_tick.set(None);
        debug!(progress = data.progress, "timeline end");
        inner.base.dispatch(&TimelineEvent::End(data));

        if inner.destroy_on_end {
            self.destroy();
        }
    }
}

impl Imitate for Timeline {
    fn imitate(&self, ratio: f64) {
        Timeline::imitate(self, ratio);
    }

    fn destroy(&self) {
        Timeline::destroy(self);
    }
}

impl HasCallbacks<TimelineEvent> for Timeline {
    fn callbacks(&self) -> &CallbackRegistry<TimelineEvent> {
        self.inner.base.callbacks()
    }
}

impl Cascade for Timeline {
    fn is_destroyed(&self) -> bool {
        Timeline::is_destroyed(self)
    }

    fn on_destroy(&self, hook: Box<dyn FnOnce()>) -> Option<Box<dyn FnOnce()>> {
        self.inner.base.on_destroy(hook)
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("state", &self.inner.state.get())
            .field("reversed", &self.is_reversed())
            .field("duration", &self.duration())
            .field("data", &self.data())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
