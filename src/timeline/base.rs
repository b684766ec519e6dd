//! TimelineBase - progress computation without a clock.
//!
//! A `TimelineBase` turns a driving ratio into [`TimelineData`] and forwards
//! its line progress to nested timelines. It never schedules frames; a
//! [`Timeline`](super::Timeline) or a parent timeline drives it through
//! [`imitate`](TimelineBase::imitate).
//!
//! # Example
//!
//! ```ignore
//! let fade = TimelineBase::new(TimelineSettings::default().line([0.0, 0.5]));
//! let slide = TimelineBase::new(TimelineSettings::default().line([0.5, 1.0]).scope([0.0, 300.0]));
//!
//! let parent = TimelineBase::default();
//! parent.add_timeline(fade.clone());
//! parent.add_timeline(slide.clone());
//!
//! parent.imitate(0.75); // fade.line == 1.0, slide.scope == 150.0
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::event::{CallbackRegistry, Descriptor};
use crate::module::{Cascade, HasCallbacks};

use super::data::{TimelineData, TimelineEvent, TimelineKind, TimelineSettings};

/// Anything a timeline can drive as a nested child.
pub trait Imitate {
    /// Recompute from a parent's line progress.
    fn imitate(&self, ratio: f64);

    fn destroy(&self);
}

struct BaseInner {
    callbacks: CallbackRegistry<TimelineEvent>,
    settings: RefCell<TimelineSettings>,
    data: Cell<TimelineData>,
    children: RefCell<Vec<Rc<dyn Imitate>>>,
    destroyed: Cell<bool>,
}

/// Cheap handle; clones share state.
#[derive(Clone)]
pub struct TimelineBase {
    inner: Rc<BaseInner>,
}

impl TimelineBase {
    pub fn new(settings: TimelineSettings) -> Self {
        let data = TimelineData::compute(0.0, &settings);
        Self {
            inner: Rc::new(BaseInner {
                callbacks: CallbackRegistry::named("timeline"),
                settings: RefCell::new(settings),
                data: Cell::new(data),
                children: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    pub fn settings(&self) -> TimelineSettings {
        self.inner.settings.borrow().clone()
    }

    /// Replace line, scope and easing. Takes effect on the next computation.
    pub fn set_settings(&self, settings: TimelineSettings) {
        *self.inner.settings.borrow_mut() = settings;
    }

    /// Values from the last computation.
    pub fn data(&self) -> TimelineData {
        self.inner.data.get()
    }

    pub fn progress(&self) -> f64 {
        self.inner.data.get().progress
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Recompute from `ratio`, dispatch `Progress`, then drive children.
    pub fn imitate(&self, ratio: f64) -> TimelineData {
        let settings = self.settings();
        self.imitate_with(ratio, &settings)
    }

    /// Like [`imitate`](Self::imitate) with `settings` in place of the stored ones.
    pub fn imitate_with(&self, ratio: f64, settings: &TimelineSettings) -> TimelineData {
        if self.is_destroyed() {
            return self.data();
        }
        let data = TimelineData::compute(ratio, settings);
        self.inner.data.set(data);
        trace!(progress = data.progress, line = data.line, "timeline progress");

        self.inner.callbacks.dispatch(&TimelineEvent::Progress(data));

        // Children after our own subscribers, in registration order.
        let children = self.inner.children.borrow().clone();
        for child in children {
            child.imitate(data.line);
        }
        data
    }

    /// Set values from `ratio` without dispatching or touching children.
    pub(crate) fn set_silent(&self, ratio: f64, settings: &TimelineSettings) {
        self.inner.data.set(TimelineData::compute(ratio, settings));
    }

    /// Nest `child`: it gets this timeline's line progress on every computation
    /// and is destroyed with it.
    pub fn add_timeline(&self, child: impl Imitate + 'static) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.inner.children.borrow_mut().push(Rc::new(child));
        true
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Destroy children, dispatch `Destroy`, drop every callback.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        debug!(children = self.child_count(), "timeline destroy");

        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.destroy();
        }

        self.inner.callbacks.dispatch(&TimelineEvent::Destroy);
        self.inner.callbacks.remove_all();
        self.inner.callbacks.close();
    }

    pub(crate) fn dispatch(&self, event: &TimelineEvent) -> usize {
        self.inner.callbacks.dispatch(event)
    }
}

impl Default for TimelineBase {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}

impl Imitate for TimelineBase {
    fn imitate(&self, ratio: f64) {
        TimelineBase::imitate(self, ratio);
    }

    fn destroy(&self) {
        TimelineBase::destroy(self);
    }
}

impl HasCallbacks<TimelineEvent> for TimelineBase {
    fn callbacks(&self) -> &CallbackRegistry<TimelineEvent> {
        &self.inner.callbacks
    }
}

impl Cascade for TimelineBase {
    fn is_destroyed(&self) -> bool {
        TimelineBase::is_destroyed(self)
    }

    fn on_destroy(&self, hook: Box<dyn FnOnce()>) -> Option<Box<dyn FnOnce()>> {
        if self.is_destroyed() {
            return None;
        }
        let mut hook = Some(hook);
        let id = self.inner.callbacks.add(
            Descriptor::new()
                .target(TimelineKind::Destroy)
                .once()
                .label("cascade")
                .callback(move |_| {
                    if let Some(hook) = hook.take() {
                        hook();
                    }
                }),
        )?;

        let weak = Rc::downgrade(&self.inner);
        Some(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.callbacks.remove(id);
            }
        }))
    }
}

impl fmt::Debug for TimelineBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineBase")
            .field("data", &self.data())
            .field("settings", &*self.inner.settings.borrow())
            .field("children", &self.child_count())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
