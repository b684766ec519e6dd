//! Module - the base every component is built from
//!
//! A [`Module`] combines:
//! - a [`CallbackRegistry`] for the component's events
//! - typed props with responsive overrides ([`HasConfig`])
//! - native listener bookkeeping ([`HasListeners`])
//! - attached plugins ([`HasPlugins`])
//! - teardown that cascades to children declared with a parent
//!
//! `Module` is a cheap handle; clones refer to the same module.
//!
//! # Example
//!
//! ```ignore
//! let popup = Module::<PopupEvent, PopupProps>::builder(ctx.clone())
//!     .name("popup")
//!     .props(json!({ "duration": 300 }))
//!     .build()?;
//!
//! popup.on(PopupKind::Show, |_| println!("shown"));
//! popup.listener(button.clone(), "click", |_| println!("clicked"));
//! popup.change_prop(json!({ "duration": 500 }))?;
//! popup.destroy();
//! ```

mod builder;
mod capabilities;
mod listeners;
mod plugin;

pub use builder::*;
pub use capabilities::*;
pub use listeners::{ListenerHandle, ListenerId, ListenerSpec};
pub use plugin::*;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{merged, resolve, responsive};
use crate::error::{json_type_name, Error, Result};
use crate::event::{CallbackRegistry, Descriptor, Event};
use crate::host::{Context, Subscription};

pub use crate::event::LifecycleEvent;

use listeners::ListenerBinding;

/// Upper bound on resolve passes when props hooks keep resizing the viewport.
const MAX_REFRESH_PASSES: usize = 8;

// =============================================================================
// TYPES
// =============================================================================

/// Events for modules that dispatch nothing beyond their lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleEvent {
    PropsChanged,
    Destroyed,
}

impl Event for ModuleEvent {
    type Kind = ModuleEvent;

    fn kind(&self) -> ModuleEvent {
        *self
    }
}

impl LifecycleEvent for ModuleEvent {
    fn props_changed() -> Self {
        ModuleEvent::PropsChanged
    }

    fn destroyed() -> Self {
        ModuleEvent::Destroyed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Active,
    Destroying,
    Destroyed,
}

pub(crate) type Hook<E, P> = Box<dyn FnMut(&Module<E, P>)>;

pub(crate) struct ConfigState<P> {
    reference: Value,
    live: Value,
    props: P,
}

pub(crate) struct ModuleInner<E: LifecycleEvent, P: Props> {
    name: String,
    context: Context,
    callbacks: CallbackRegistry<E>,
    listeners: RefCell<Vec<ListenerBinding>>,
    next_listener_id: Cell<u64>,
    plugins: RefCell<Vec<Box<dyn Plugin<E, P>>>>,
    config: RefCell<ConfigState<P>>,
    lifecycle: Cell<Lifecycle>,
    initialized: Cell<bool>,
    on_init: RefCell<Option<Hook<E, P>>>,
    on_props_changed: RefCell<Option<Hook<E, P>>>,
    viewport_sub: RefCell<Option<Subscription>>,
    parent_detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl<E: LifecycleEvent, P: Props> Drop for ModuleInner<E, P> {
    // Dropped without destroy(): still release what lives outside the module.
    fn drop(&mut self) {
        for binding in self.listeners.get_mut().drain(..) {
            binding.unbind();
        }
        if let Some(sub) = self.viewport_sub.get_mut().take() {
            sub.cancel();
        }
        if let Some(detach) = self.parent_detach.get_mut().take() {
            detach();
        }
    }
}

// =============================================================================
// MODULE
// =============================================================================

pub struct Module<E: LifecycleEvent, P: Props> {
    inner: Rc<ModuleInner<E, P>>,
}

impl<E: LifecycleEvent, P: Props> Clone for Module<E, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: LifecycleEvent, P: Props> Module<E, P> {
    pub fn builder<'a>(context: Context) -> ModuleBuilder<'a, E, P> {
        ModuleBuilder::new(context)
    }

    /// Build with `overrides` over the default props.
    pub fn new(context: Context, overrides: Value) -> Result<Self> {
        Self::builder(context).props(overrides).build()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    pub fn downgrade(&self) -> WeakModule<E, P> {
        WeakModule {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Same underlying module.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.get() == Lifecycle::Active
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lifecycle.get() == Lifecycle::Destroyed
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    /// Run the init hook. Only the first call on an active module does anything.
    pub fn init(&self) -> bool {
        if !self.is_active() || self.inner.initialized.get() {
            return false;
        }
        self.inner.initialized.set(true);
        debug!(module = %self.name(), "module init");
        self.run_hook(&self.inner.on_init);
        true
    }

    // Hooks are taken out while running so they may call back into the module.
    fn run_hook(&self, slot: &RefCell<Option<Hook<E, P>>>) {
        let hook = slot.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(self);
            let mut slot = slot.borrow_mut();
            if slot.is_none() && self.is_active() {
                *slot = Some(hook);
            }
        }
    }

    fn notify_props_changed(&self) {
        self.run_hook(&self.inner.on_props_changed);
        self.inner.callbacks.dispatch(&E::props_changed());
    }

    /// Subscribe to the viewport while the reference config has responsive rules.
    fn sync_viewport_subscription(&self) {
        let wanted = responsive::has_rules(&self.inner.config.borrow().reference);
        let subscribed = self.inner.viewport_sub.borrow().is_some();

        if wanted && !subscribed {
            let weak = Rc::downgrade(&self.inner);
            let sub = self.inner.context.viewport.subscribe(move |_| {
                if let Some(inner) = weak.upgrade() {
                    Module { inner }.refresh_responsive();
                }
            });
            *self.inner.viewport_sub.borrow_mut() = Some(sub);
        } else if !wanted && subscribed {
            let sub = self.inner.viewport_sub.borrow_mut().take();
            if let Some(sub) = sub {
                sub.cancel();
            }
        }
    }

    /// Re-derive live config for the current viewport.
    ///
    /// A props hook may itself resize the viewport; that nested dispatch
    /// skips this module's listener while it runs, so resolving repeats
    /// here until the config settles.
    fn refresh_responsive(&self) {
        for _ in 0..MAX_REFRESH_PASSES {
            if !self.apply_responsive() {
                return;
            }
        }
        warn!(module = %self.name(), "viewport kept changing during props hooks; stopped re-resolving");
    }

    /// One resolve pass. Returns true when the live config changed and
    /// listeners were notified.
    fn apply_responsive(&self) -> bool {
        if !self.is_active() {
            return false;
        }

        let live = {
            let config = self.inner.config.borrow();
            let live = resolve(&config.reference, &self.inner.context.viewport.state());
            if live == config.live {
                return false;
            }
            live
        };

        let props: P = match serde_json::from_value(live.clone()) {
            Ok(props) => props,
            Err(err) => {
                warn!(module = %self.name(), %err, "responsive props rejected; keeping previous");
                return false;
            }
        };

        {
            let mut config = self.inner.config.borrow_mut();
            config.live = live;
            config.props = props;
        }
        debug!(module = %self.name(), "responsive props applied");
        self.notify_props_changed();
        true
    }

    /// Tear down: dispatch the destroyed event, then drop callbacks,
    /// listeners and plugins. Later calls do nothing.
    pub fn destroy(&self) {
        if !self.is_active() {
            return;
        }
        self.inner.lifecycle.set(Lifecycle::Destroying);
        debug!(module = %self.name(), "module destroy");

        self.inner.callbacks.dispatch(&E::destroyed());

        self.remove_event_listeners();
        self.remove_plugins();
        self.inner.callbacks.remove_all();
        self.inner.callbacks.close();

        let sub = self.inner.viewport_sub.borrow_mut().take();
        if let Some(sub) = sub {
            sub.cancel();
        }
        let detach = self.inner.parent_detach.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
        // Hooks may capture this module; drop them to break the cycle.
        self.inner.on_init.borrow_mut().take();
        self.inner.on_props_changed.borrow_mut().take();

        self.inner.lifecycle.set(Lifecycle::Destroyed);
    }

    /// Run `f` with the live props without cloning them.
    pub fn with_props<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.inner.config.borrow().props)
    }

    /// One key of the live configuration.
    pub fn prop(&self, key: &str) -> Option<Value> {
        self.inner.config.borrow().live.get(key).cloned()
    }
}

impl<E: LifecycleEvent, P: Props> HasConfig<P> for Module<E, P> {
    fn props(&self) -> P {
        self.inner.config.borrow().props.clone()
    }

    fn live_config(&self) -> Value {
        self.inner.config.borrow().live.clone()
    }

    fn reference_config(&self) -> Value {
        self.inner.config.borrow().reference.clone()
    }

    fn change_prop(&self, partial: Value) -> Result<()> {
        if !self.is_active() {
            return Err(Error::Destroyed(self.name().to_string()));
        }
        if !partial.is_object() {
            return Err(Error::NotAnObject(json_type_name(&partial)));
        }

        let reference = merged(&self.inner.config.borrow().reference, &partial);
        let live = resolve(&reference, &self.inner.context.viewport.state());
        let props: P = serde_json::from_value(live.clone())?;

        {
            let mut config = self.inner.config.borrow_mut();
            config.reference = reference;
            config.live = live;
            config.props = props;
        }
        debug!(module = %self.name(), "props changed");

        self.sync_viewport_subscription();
        self.notify_props_changed();
        Ok(())
    }
}

impl<E: LifecycleEvent, P: Props> Cascade for Module<E, P> {
    fn is_destroyed(&self) -> bool {
        Module::is_destroyed(self)
    }

    fn on_destroy(&self, hook: Box<dyn FnOnce()>) -> Option<Box<dyn FnOnce()>> {
        if !self.is_active() {
            return None;
        }
        let mut hook = Some(hook);
        let id = self.inner.callbacks.add(
            Descriptor::new()
                .target(E::destroyed().kind())
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

impl<E: LifecycleEvent, P: Props> fmt::Debug for Module<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.inner.name)
            .field("lifecycle", &self.inner.lifecycle.get())
            .field("callbacks", &self.inner.callbacks.len())
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("plugins", &self.inner.plugins.borrow().len())
            .finish()
    }
}

/// Non-owning module reference, e.g. a plugin's back-reference to its owner.
pub struct WeakModule<E: LifecycleEvent, P: Props> {
    inner: Weak<ModuleInner<E, P>>,
}

impl<E: LifecycleEvent, P: Props> WeakModule<E, P> {
    pub fn upgrade(&self) -> Option<Module<E, P>> {
        self.inner.upgrade().map(|inner| Module { inner })
    }
}

impl<E: LifecycleEvent, P: Props> Clone for WeakModule<E, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<E: LifecycleEvent, P: Props> fmt::Debug for WeakModule<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakModule")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
