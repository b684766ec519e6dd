//! Plugins - behavior attached to a module after construction.
//!
//! The module owns its plugins and destroys them with itself. A plugin that
//! needs its owner later keeps a [`WeakModule`](super::WeakModule) taken in
//! `init`.
//!
//! # Example
//!
//! ```ignore
//! struct AutoHide { owner: Option<WeakModule<PopupEvent, PopupProps>> }
//!
//! impl Plugin<PopupEvent, PopupProps> for AutoHide {
//!     fn init(&mut self, owner: &Module<PopupEvent, PopupProps>) {
//!         self.owner = Some(owner.downgrade());
//!         owner.on(PopupKind::Show, |_| { /* start timer */ });
//!     }
//! }
//!
//! popup.add_plugin(Box::new(AutoHide { owner: None }));
//! ```

use tracing::{debug, warn};

use super::capabilities::{HasPlugins, Props};
use super::{LifecycleEvent, Module};

pub trait Plugin<E: LifecycleEvent, P: Props> {
    fn name(&self) -> &str {
        "plugin"
    }

    /// Called once, when attached.
    fn init(&mut self, owner: &Module<E, P>);

    /// Called when the owner removes its plugins or is destroyed.
    fn destroy(&mut self) {}
}

impl<E: LifecycleEvent, P: Props> HasPlugins<E, P> for Module<E, P> {
    fn add_plugin(&self, mut plugin: Box<dyn Plugin<E, P>>) -> bool {
        if !self.is_active() {
            warn!(module = %self.name(), plugin = plugin.name(), "plugin on destroyed module ignored");
            return false;
        }

        // init runs outside any borrow: plugins usually register callbacks
        // and listeners on the owner.
        plugin.init(self);
        debug!(module = %self.name(), plugin = plugin.name(), "plugin attached");
        self.inner.plugins.borrow_mut().push(plugin);
        true
    }

    fn remove_plugins(&self) {
        let plugins = std::mem::take(&mut *self.inner.plugins.borrow_mut());
        for mut plugin in plugins {
            debug!(module = %self.name(), plugin = plugin.name(), "plugin destroyed");
            plugin.destroy();
        }
    }

    fn plugin_count(&self) -> usize {
        self.inner.plugins.borrow().len()
    }
}
