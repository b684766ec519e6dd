//! Viewport - size state and resize notifications.
//!
//! The current [`ViewportState`] lives in a signal so reactive code can read
//! it; resize subscribers are notified through a [`CallbackRegistry`].
//!
//! # Example
//!
//! ```ignore
//! let viewport = Viewport::new(1280.0, 720.0);
//! let sub = viewport.subscribe(|state| println!("{}x{}", state.width, state.height));
//! viewport.resize(800.0, 600.0);
//! sub.cancel();
//! ```

use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};
use tracing::debug;

use crate::event::{CallbackId, CallbackRegistry, Event};

// =============================================================================
// TYPES
// =============================================================================

/// Width class of the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewportMode {
    Desktop,
    Tablet,
    Mobile,
}

/// Width thresholds (inclusive) for [`ViewportMode`] classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportBreakpoints {
    pub tablet: f64,
    pub mobile: f64,
}

impl Default for ViewportBreakpoints {
    fn default() -> Self {
        Self {
            tablet: 1199.0,
            mobile: 899.0,
        }
    }
}

impl ViewportBreakpoints {
    pub fn classify(&self, width: f64) -> ViewportMode {
        if width <= self.mobile {
            ViewportMode::Mobile
        } else if width <= self.tablet {
            ViewportMode::Tablet
        } else {
            ViewportMode::Desktop
        }
    }
}

/// Snapshot of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub width: f64,
    pub height: f64,
    pub mode: ViewportMode,
    /// Touch/handheld device, independent of width.
    pub mobile_device: bool,
}

impl ViewportState {
    pub fn new(width: f64, height: f64, breakpoints: &ViewportBreakpoints) -> Self {
        Self {
            width,
            height,
            mode: breakpoints.classify(width),
            mobile_device: false,
        }
    }

    pub fn is_desktop(&self) -> bool {
        self.mode == ViewportMode::Desktop
    }

    pub fn is_tablet(&self) -> bool {
        self.mode == ViewportMode::Tablet
    }

    pub fn is_mobile(&self) -> bool {
        self.mode == ViewportMode::Mobile
    }
}

/// What changed in a viewport notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportChange {
    /// Any change. Dispatched on every notification.
    Resize,
    Width,
    Height,
    Mode,
}

/// Viewport notification payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportEvent {
    pub change: ViewportChange,
    pub state: ViewportState,
}

impl Event for ViewportEvent {
    type Kind = ViewportChange;

    fn kind(&self) -> ViewportChange {
        self.change
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

struct ViewportInner {
    state: Signal<ViewportState>,
    breakpoints: ViewportBreakpoints,
    callbacks: CallbackRegistry<ViewportEvent>,
}

/// Shared handle to viewport state. Clones refer to the same viewport.
#[derive(Clone)]
pub struct Viewport {
    inner: Rc<ViewportInner>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_breakpoints(width, height, ViewportBreakpoints::default())
    }

    pub fn with_breakpoints(width: f64, height: f64, breakpoints: ViewportBreakpoints) -> Self {
        Self {
            inner: Rc::new(ViewportInner {
                state: signal(ViewportState::new(width, height, &breakpoints)),
                breakpoints,
                callbacks: CallbackRegistry::named("viewport"),
            }),
        }
    }

    pub fn state(&self) -> ViewportState {
        self.inner.state.get()
    }

    /// Reactive view of the state.
    pub fn signal(&self) -> Signal<ViewportState> {
        self.inner.state.clone()
    }

    pub fn breakpoints(&self) -> ViewportBreakpoints {
        self.inner.breakpoints
    }

    /// Update the size. Returns false (and notifies nobody) if nothing changed.
    pub fn resize(&self, width: f64, height: f64) -> bool {
        let prev = self.state();
        let next = ViewportState {
            width,
            height,
            mode: self.inner.breakpoints.classify(width),
            mobile_device: prev.mobile_device,
        };
        self.apply(prev, next)
    }

    /// Mark the host as a handheld/touch device.
    pub fn set_mobile_device(&self, mobile_device: bool) -> bool {
        let prev = self.state();
        let next = ViewportState {
            mobile_device,
            ..prev
        };
        self.apply(prev, next)
    }

    fn apply(&self, prev: ViewportState, next: ViewportState) -> bool {
        if prev == next {
            return false;
        }
        self.inner.state.set(next);
        debug!(width = next.width, height = next.height, mode = ?next.mode, "viewport changed");

        let callbacks = &self.inner.callbacks;
        let notify = |change| {
            callbacks.dispatch(&ViewportEvent {
                change,
                state: next,
            });
        };
        if prev.width != next.width {
            notify(ViewportChange::Width);
        }
        if prev.height != next.height {
            notify(ViewportChange::Height);
        }
        if prev.mode != next.mode {
            notify(ViewportChange::Mode);
        }
        notify(ViewportChange::Resize);
        true
    }

    /// Subscribe to every change.
    #[must_use = "dropping the subscription without cancel() keeps the callback registered"]
    pub fn subscribe<F>(&self, mut f: F) -> Subscription
    where
        F: FnMut(&ViewportState) + 'static,
    {
        self.subscribe_to(ViewportChange::Resize, move |event| f(&event.state))
    }

    /// Subscribe to one kind of change.
    #[must_use = "dropping the subscription without cancel() keeps the callback registered"]
    pub fn subscribe_to<F>(&self, change: ViewportChange, f: F) -> Subscription
    where
        F: FnMut(&ViewportEvent) + 'static,
    {
        let id = self.inner.callbacks.on(change, f);
        Subscription {
            viewport: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.callbacks.len()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle to a viewport subscription.
#[derive(Debug)]
pub struct Subscription {
    viewport: Weak<ViewportInner>,
    id: Option<CallbackId>,
}

impl Subscription {
    /// Unsubscribe. Returns false if the viewport is gone or already unsubscribed.
    pub fn cancel(self) -> bool {
        self.viewport
            .upgrade()
            .zip(self.id)
            .is_some_and(|(inner, id)| inner.callbacks.remove(id))
    }
}
