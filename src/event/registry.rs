//! Callback registry - ordered, id-keyed callback records.
//!
//! Records are kept in registration order. Ids come from a per-registry
//! counter and are never reused, so a stale id can only ever miss.
//!
//! Every method takes `&self`; callbacks may add, remove, enable or disable
//! records of the same registry while a dispatch is running.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use serde_json::Value;
use tracing::{error, trace, warn};

use super::descriptor::{Callback, Descriptor};
use super::target::{Event, Target};

// =============================================================================
// TYPES
// =============================================================================

/// Identifier of a callback record, unique for the lifetime of its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(u64);

impl CallbackId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb{}", self.0)
    }
}

type SharedCallback<E> = Rc<RefCell<Callback<E>>>;

struct Record<E: Event> {
    id: CallbackId,
    target: Target<E::Kind>,
    enabled: bool,
    once: bool,
    label: Option<String>,
    data: Option<Value>,
    callback: SharedCallback<E>,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Keyed collection of callbacks for one component.
pub struct CallbackRegistry<E: Event> {
    name: String,
    records: RefCell<Vec<Record<E>>>,
    next_id: Cell<u64>,
    closed: Cell<bool>,
}

impl<E: Event> CallbackRegistry<E> {
    pub fn new() -> Self {
        Self::named("registry")
    }

    /// Create a registry whose name appears in trace output.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            closed: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn next_id(&self) -> CallbackId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        CallbackId(id)
    }

    // Records are appended with increasing ids and removal keeps order,
    // so the vector stays sorted by id.
    fn position(records: &[Record<E>], id: CallbackId) -> Option<usize> {
        records.binary_search_by_key(&id, |r| r.id).ok()
    }

    /// Register a callback.
    ///
    /// Returns `None` when the descriptor has no callback.
    pub fn add(&self, descriptor: Descriptor<E>) -> Option<CallbackId> {
        let Descriptor {
            target,
            once,
            enabled,
            label,
            data,
            callback,
        } = descriptor;

        let Some(callback) = callback else {
            warn!(registry = %self.name, ?target, "descriptor without callback ignored");
            return None;
        };
        if self.closed.get() {
            warn!(registry = %self.name, ?target, "registry closed; callback ignored");
            return None;
        }

        let id = self.next_id();
        trace!(registry = %self.name, %id, ?target, once, "callback added");
        self.records.borrow_mut().push(Record {
            id,
            target,
            enabled,
            once,
            label,
            data,
            callback: Rc::new(RefCell::new(callback)),
        });
        Some(id)
    }

    /// Register `f` for dispatches of `kind`.
    pub fn on<F>(&self, kind: E::Kind, f: F) -> Option<CallbackId>
    where
        F: FnMut(&E) + 'static,
    {
        self.add(Descriptor::on(kind, f))
    }

    /// Remove a record. Returns false for unknown ids.
    pub fn remove(&self, id: CallbackId) -> bool {
        let mut records = self.records.borrow_mut();
        match Self::position(&records, id) {
            Some(pos) => {
                records.remove(pos);
                trace!(registry = %self.name, %id, "callback removed");
                true
            }
            None => false,
        }
    }

    /// Remove every record regardless of target or enabled state.
    pub fn remove_all(&self) {
        let removed = {
            let mut records = self.records.borrow_mut();
            std::mem::take(&mut *records)
        };
        trace!(registry = %self.name, count = removed.len(), "all callbacks removed");
        // Dropped outside the borrow: a callback's captures may touch this registry.
        drop(removed);
    }

    /// Refuse further registrations. Used when the owner is torn down.
    pub fn close(&self) {
        self.closed.set(true);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn set_enabled(&self, id: CallbackId, enabled: bool) -> bool {
        let mut records = self.records.borrow_mut();
        match Self::position(&records, id) {
            Some(pos) => {
                records[pos].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Re-enable a record. Returns false for unknown ids.
    pub fn enable(&self, id: CallbackId) -> bool {
        self.set_enabled(id, true)
    }

    /// Disable a record; it stays registered but is skipped on dispatch.
    pub fn disable(&self, id: CallbackId) -> bool {
        self.set_enabled(id, false)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        Self::position(&self.records.borrow(), id).is_some()
    }

    /// `None` for unknown ids.
    pub fn is_enabled(&self, id: CallbackId) -> Option<bool> {
        let records = self.records.borrow();
        Self::position(&records, id).map(|pos| records[pos].enabled)
    }

    /// Caller data stored with the record.
    pub fn data(&self, id: CallbackId) -> Option<Value> {
        let records = self.records.borrow();
        Self::position(&records, id).and_then(|pos| records[pos].data.clone())
    }

    pub fn label(&self, id: CallbackId) -> Option<String> {
        let records = self.records.borrow();
        Self::position(&records, id).and_then(|pos| records[pos].label.clone())
    }

    /// Ids in registration order.
    pub fn ids(&self) -> Vec<CallbackId> {
        self.records.borrow().iter().map(|r| r.id).collect()
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Dispatch `event` to records targeting its kind (and wildcard records).
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &E) -> usize {
        self.dispatch_target(event.kind(), event)
    }

    /// Dispatch `payload` to records targeting `kind` (and wildcard records).
    pub fn dispatch_target(&self, kind: E::Kind, payload: &E) -> usize {
        self.run(payload, Some(kind))
    }

    /// Dispatch `payload` to every enabled record regardless of target.
    pub fn dispatch_all(&self, payload: &E) -> usize {
        self.run(payload, None)
    }

    fn run(&self, payload: &E, kind: Option<E::Kind>) -> usize {
        // Snapshot so callbacks can mutate the registry mid-pass.
        let batch: Vec<(CallbackId, SharedCallback<E>)> = {
            let records = self.records.borrow();
            records
                .iter()
                .filter(|r| r.enabled && kind.as_ref().is_none_or(|k| r.target.matches(k)))
                .map(|r| (r.id, Rc::clone(&r.callback)))
                .collect()
        };

        trace!(registry = %self.name, ?kind, candidates = batch.len(), "dispatch");

        let mut invoked = 0;
        for (id, callback) in batch {
            // Removed or disabled by an earlier callback in this pass.
            let (once, label) = {
                let records = self.records.borrow();
                match Self::position(&records, id) {
                    Some(pos) if records[pos].enabled => {
                        (records[pos].once, records[pos].label.clone())
                    }
                    _ => continue,
                }
            };

            // Once-records leave before running so a panic or a nested
            // dispatch cannot fire them twice.
            if once {
                self.remove(id);
            }

            let Ok(mut callback) = callback.try_borrow_mut() else {
                warn!(registry = %self.name, %id, "callback re-entered during its own dispatch; skipped");
                continue;
            };

            invoked += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (*callback)(payload)));
            if let Err(panic) = outcome {
                error!(
                    registry = %self.name,
                    %id,
                    label = label.as_deref().unwrap_or(""),
                    message = panic_message(&*panic),
                    "callback panicked during dispatch"
                );
            }
        }
        invoked
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

impl<E: Event> Default for CallbackRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for CallbackRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
