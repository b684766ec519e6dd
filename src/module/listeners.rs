//! Native listener bookkeeping.
//!
//! Every listener a module binds is recorded with its element so the module
//! can unbind one by handle or all of them at teardown. The records are
//! independent from the callback registry.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::host::{EventTarget, HostEvent, HostListenerId, Listener, ListenerOptions};

use super::capabilities::{HasListeners, Props};
use super::{LifecycleEvent, Module, ModuleInner};

/// Module-local listener id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Returned by [`HasListeners::add_event_listener`]; pass back to remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    pub id: ListenerId,
}

/// A listener to bind: element, event name, callback and options.
pub struct ListenerSpec {
    pub element: Rc<dyn EventTarget>,
    pub event_name: String,
    pub callback: Listener,
    pub options: ListenerOptions,
}

impl ListenerSpec {
    pub fn new<F>(element: Rc<dyn EventTarget>, event_name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&HostEvent) + 'static,
    {
        Self {
            element,
            event_name: event_name.into(),
            callback: Rc::new(callback),
            options: ListenerOptions::empty(),
        }
    }

    pub fn options(mut self, options: ListenerOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for ListenerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSpec")
            .field("event_name", &self.event_name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

pub(crate) struct ListenerBinding {
    pub(crate) id: ListenerId,
    pub(crate) element: Rc<dyn EventTarget>,
    pub(crate) event_name: String,
    pub(crate) host_id: HostListenerId,
}

impl ListenerBinding {
    pub(crate) fn unbind(&self) {
        if !self.element.remove_listener(self.host_id) {
            trace!(event = %self.event_name, "listener already gone from host");
        }
    }
}

impl<E: LifecycleEvent, P: Props> ModuleInner<E, P> {
    fn next_listener_id(&self) -> ListenerId {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        ListenerId(id)
    }

    fn forget_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|b| b.id != id);
    }
}

impl<E: LifecycleEvent, P: Props> HasListeners for Module<E, P> {
    fn add_event_listener(&self, spec: ListenerSpec) -> Option<ListenerHandle> {
        if !self.is_active() {
            warn!(module = %self.name(), event = %spec.event_name, "listener on destroyed module ignored");
            return None;
        }

        let ListenerSpec {
            element,
            event_name,
            callback,
            options,
        } = spec;

        let id = self.inner.next_listener_id();

        // A host-side once-listener unbinds itself; drop our record with it.
        let listener: Listener = if options.contains(ListenerOptions::ONCE) {
            let weak: Weak<ModuleInner<E, P>> = Rc::downgrade(&self.inner);
            Rc::new(move |event: &HostEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.forget_listener(id);
                }
                callback(event);
            })
        } else {
            callback
        };

        let host_id = element.add_listener(&event_name, listener, options);
        debug!(module = %self.name(), event = %event_name, ?options, "listener added");
        self.inner.listeners.borrow_mut().push(ListenerBinding {
            id,
            element,
            event_name,
            host_id,
        });
        Some(ListenerHandle { id })
    }

    fn remove_event_listener(&self, handle: &ListenerHandle) -> bool {
        let binding = {
            let mut listeners = self.inner.listeners.borrow_mut();
            let Some(pos) = listeners.iter().position(|b| b.id == handle.id) else {
                return false;
            };
            listeners.remove(pos)
        };
        binding.unbind();
        true
    }

    fn remove_event_listeners(&self) {
        let bindings = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        if !bindings.is_empty() {
            debug!(module = %self.name(), count = bindings.len(), "listeners removed");
        }
        for binding in &bindings {
            binding.unbind();
        }
    }

    fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}
