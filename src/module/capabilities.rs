//! Capability traits a component composes instead of inheriting from a base class.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::event::{CallbackId, CallbackRegistry, Descriptor, Event};
use crate::host::{EventTarget, HostEvent};

use super::listeners::{ListenerHandle, ListenerSpec};
use super::plugin::Plugin;
use super::{LifecycleEvent, Module};

use std::rc::Rc;

/// Typed module configuration.
///
/// `Default` supplies the default props; values travel as JSON so overrides
/// and responsive patches can be partial.
pub trait Props: Serialize + DeserializeOwned + Default + Clone + 'static {}

impl<T> Props for T where T: Serialize + DeserializeOwned + Default + Clone + 'static {}

/// Owns a callback registry.
pub trait HasCallbacks<E: Event> {
    fn callbacks(&self) -> &CallbackRegistry<E>;

    fn add_callback(&self, descriptor: Descriptor<E>) -> Option<CallbackId> {
        self.callbacks().add(descriptor)
    }

    fn on<F>(&self, kind: E::Kind, f: F) -> Option<CallbackId>
    where
        F: FnMut(&E) + 'static,
        Self: Sized,
    {
        self.callbacks().on(kind, f)
    }

    fn remove_callback(&self, id: CallbackId) -> bool {
        self.callbacks().remove(id)
    }

    fn enable_callback(&self, id: CallbackId) -> bool {
        self.callbacks().enable(id)
    }

    fn disable_callback(&self, id: CallbackId) -> bool {
        self.callbacks().disable(id)
    }

    /// Dispatch `event` by its kind.
    fn dispatch(&self, event: &E) -> usize {
        self.callbacks().dispatch(event)
    }
}

/// Holds a responsive configuration.
pub trait HasConfig<P: Props> {
    /// Live typed props.
    fn props(&self) -> P;

    /// Live configuration as JSON, responsive overrides applied.
    fn live_config(&self) -> Value;

    /// Configuration before responsive overrides.
    fn reference_config(&self) -> Value;

    /// Deep-merge `partial` into the configuration.
    fn change_prop(&self, partial: Value) -> Result<()>;
}

/// Tracks native listeners it installed.
pub trait HasListeners {
    fn add_event_listener(&self, spec: ListenerSpec) -> Option<ListenerHandle>;

    /// Shorthand for a listener with default options.
    fn listener<F>(&self, element: Rc<dyn EventTarget>, event_name: &str, callback: F) -> Option<ListenerHandle>
    where
        F: Fn(&HostEvent) + 'static,
        Self: Sized,
    {
        self.add_event_listener(ListenerSpec::new(element, event_name, callback))
    }

    fn remove_event_listener(&self, handle: &ListenerHandle) -> bool;

    fn remove_event_listeners(&self);

    fn listener_count(&self) -> usize;
}

/// Owns attached plugins.
pub trait HasPlugins<E: LifecycleEvent, P: Props> {
    /// Attach `plugin`, calling its `init` with the owner.
    fn add_plugin(&self, plugin: Box<dyn Plugin<E, P>>) -> bool;

    fn remove_plugins(&self);

    fn plugin_count(&self) -> usize;
}

/// Something whose destruction dependents can follow.
pub trait Cascade {
    fn is_destroyed(&self) -> bool;

    /// Run `hook` when this object is destroyed.
    ///
    /// Returns a detach function, or `None` if already destroyed.
    fn on_destroy(&self, hook: Box<dyn FnOnce()>) -> Option<Box<dyn FnOnce()>>;
}

impl<E: LifecycleEvent, P: Props> HasCallbacks<E> for Module<E, P> {
    fn callbacks(&self) -> &CallbackRegistry<E> {
        &self.inner.callbacks
    }
}
