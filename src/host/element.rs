//! Host elements - native event listener bindings.
//!
//! [`EventTarget`] is the slice of a DOM element a module needs: bind and
//! unbind named listeners. [`Element`] is an in-memory target for headless
//! hosts and tests; `emit` plays the role of the browser firing an event.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use serde_json::Value;
use tracing::trace;

bitflags! {
    /// Listener options, mirroring `addEventListener`'s option bag.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListenerOptions: u8 {
        /// Unbind after the first call.
        const ONCE = 1 << 0;
        /// `prevent_default` is ignored.
        const PASSIVE = 1 << 1;
        /// Capture phase.
        const CAPTURE = 1 << 2;
    }
}

/// Id of a binding on one host element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HostListenerId(u64);

/// Event delivered to native listeners.
#[derive(Debug)]
pub struct HostEvent {
    pub name: String,
    pub detail: Value,
    default_prevented: Cell<bool>,
    passive: Cell<bool>,
}

impl HostEvent {
    pub fn new(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
            default_prevented: Cell::new(false),
            passive: Cell::new(false),
        }
    }

    /// No-op inside passive listeners.
    pub fn prevent_default(&self) {
        if !self.passive.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type Listener = Rc<dyn Fn(&HostEvent)>;

/// Something native listeners can be bound to.
pub trait EventTarget {
    fn add_listener(&self, event_name: &str, listener: Listener, options: ListenerOptions) -> HostListenerId;

    /// Returns false if the binding was unknown.
    fn remove_listener(&self, id: HostListenerId) -> bool;
}

// =============================================================================
// IN-MEMORY ELEMENT
// =============================================================================

struct Binding {
    id: HostListenerId,
    event_name: String,
    listener: Listener,
    options: ListenerOptions,
}

/// Headless element with a listener table.
pub struct Element {
    tag: String,
    bindings: RefCell<Vec<Binding>>,
    next_id: Cell<u64>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            tag: tag.into(),
            bindings: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Bindings currently attached, across all event names.
    pub fn listener_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Fire `event_name` at this element. Capture listeners run first.
    pub fn emit(&self, event_name: &str, detail: Value) -> HostEvent {
        let event = HostEvent::new(event_name, detail);

        let mut batch: Vec<(HostListenerId, Listener, ListenerOptions)> = self
            .bindings
            .borrow()
            .iter()
            .filter(|b| b.event_name == event_name)
            .map(|b| (b.id, Rc::clone(&b.listener), b.options))
            .collect();
        batch.sort_by_key(|(_, _, options)| !options.contains(ListenerOptions::CAPTURE));

        trace!(tag = %self.tag, event = event_name, listeners = batch.len(), "emit");

        for (id, listener, options) in batch {
            if options.contains(ListenerOptions::ONCE) {
                self.remove_listener(id);
            }
            event.passive.set(options.contains(ListenerOptions::PASSIVE));
            listener(&event);
        }
        event.passive.set(false);
        event
    }
}

impl EventTarget for Element {
    fn add_listener(&self, event_name: &str, listener: Listener, options: ListenerOptions) -> HostListenerId {
        let id = HostListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.bindings.borrow_mut().push(Binding {
            id,
            event_name: event_name.to_string(),
            listener,
            options,
        });
        id
    }

    fn remove_listener(&self, id: HostListenerId) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        let before = bindings.len();
        bindings.retain(|b| b.id != id);
        bindings.len() != before
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
