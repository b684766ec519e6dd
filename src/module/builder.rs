//! Module construction.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::config::{deep_merge, resolve};
use crate::error::{json_type_name, Error, Result};
use crate::event::CallbackRegistry;
use crate::host::Context;

use super::capabilities::{Cascade, Props};
use super::{ConfigState, Hook, LifecycleEvent, Lifecycle, Module, ModuleInner};

/// Builder returned by [`Module::builder`].
///
/// ```ignore
/// let slider = Module::<SliderEvent, SliderProps>::builder(ctx)
///     .name("slider")
///     .props(json!({ "gap": 20, "responsive": [{ "breakpoint": "mobile", "settings": { "gap": 8 } }] }))
///     .on_props_changed(|m| m.dispatch(&SliderEvent::Relayout))
///     .build()?;
/// ```
pub struct ModuleBuilder<'a, E: LifecycleEvent, P: Props> {
    context: Context,
    name: String,
    overrides: Value,
    parent: Option<&'a dyn Cascade>,
    init: bool,
    on_init: Option<Hook<E, P>>,
    on_props_changed: Option<Hook<E, P>>,
}

impl<'a, E: LifecycleEvent, P: Props> ModuleBuilder<'a, E, P> {
    pub(crate) fn new(context: Context) -> Self {
        Self {
            context,
            name: "module".to_string(),
            overrides: Value::Null,
            parent: None,
            init: true,
            on_init: None,
            on_props_changed: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides merged over `P::default()`. Must be a JSON object.
    pub fn props(mut self, overrides: Value) -> Self {
        self.overrides = overrides;
        self
    }

    /// Destroy the module when `parent` is destroyed.
    pub fn parent(mut self, parent: &'a dyn Cascade) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Run the init hook during `build` (default) or defer it to [`Module::init`].
    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    pub fn on_init<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Module<E, P>) + 'static,
    {
        self.on_init = Some(Box::new(hook));
        self
    }

    pub fn on_props_changed<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Module<E, P>) + 'static,
    {
        self.on_props_changed = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Result<Module<E, P>> {
        let overrides = match self.overrides {
            Value::Null => None,
            value @ Value::Object(_) => Some(value),
            other => return Err(Error::NotAnObject(json_type_name(&other))),
        };

        let mut reference = serde_json::to_value(P::default())?;
        if let Some(overrides) = &overrides {
            deep_merge(&mut reference, overrides);
        }
        let live = resolve(&reference, &self.context.viewport.state());
        let props: P = serde_json::from_value(live.clone())?;

        let module = Module {
            inner: Rc::new(ModuleInner {
                callbacks: CallbackRegistry::named(self.name.clone()),
                name: self.name,
                context: self.context,
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                plugins: RefCell::new(Vec::new()),
                config: RefCell::new(ConfigState {
                    reference,
                    live,
                    props,
                }),
                lifecycle: Cell::new(Lifecycle::Active),
                initialized: Cell::new(false),
                on_init: RefCell::new(self.on_init),
                on_props_changed: RefCell::new(self.on_props_changed),
                viewport_sub: RefCell::new(None),
                parent_detach: RefCell::new(None),
            }),
        };

        if let Some(parent) = self.parent {
            let child = module.downgrade();
            let detach = parent.on_destroy(Box::new(move || {
                if let Some(child) = child.upgrade() {
                    child.destroy();
                }
            }));
            let Some(detach) = detach else {
                return Err(Error::ParentDestroyed);
            };
            *module.inner.parent_detach.borrow_mut() = Some(detach);
        }

        module.sync_viewport_subscription();
        debug!(module = %module.name(), "module created");

        if self.init {
            module.init();
        }
        Ok(module)
    }
}
