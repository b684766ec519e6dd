//! Callback descriptors - everything `add` needs to build a record.

use serde_json::Value;

use super::target::{Event, Target};

/// Boxed callback stored in a registry record.
pub type Callback<E> = Box<dyn FnMut(&E)>;

/// Describes a callback to register.
///
/// A descriptor without a callback is structurally invalid; `add` rejects it
/// and returns `None`.
///
/// ```ignore
/// let id = registry.add(
///     Descriptor::new()
///         .target(SliderKind::Show)
///         .once()
///         .callback(|event| println!("{event:?}")),
/// );
/// ```
pub struct Descriptor<E: Event> {
    pub(crate) target: Target<E::Kind>,
    pub(crate) once: bool,
    pub(crate) enabled: bool,
    pub(crate) label: Option<String>,
    pub(crate) data: Option<Value>,
    pub(crate) callback: Option<Callback<E>>,
}

impl<E: Event> Descriptor<E> {
    /// Empty descriptor: wildcard target, enabled, no callback yet.
    pub fn new() -> Self {
        Self {
            target: Target::Any,
            once: false,
            enabled: true,
            label: None,
            data: None,
            callback: None,
        }
    }

    /// Shorthand for `Descriptor::new().target(kind).callback(f)`.
    pub fn on<F>(kind: E::Kind, f: F) -> Self
    where
        F: FnMut(&E) + 'static,
    {
        Self::new().target(kind).callback(f)
    }

    /// Restrict the callback to dispatches of `target`.
    pub fn target(mut self, target: impl Into<Target<E::Kind>>) -> Self {
        self.target = target.into();
        self
    }

    /// Remove the record after its first invocation.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Register in the disabled state.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Name shown in trace output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Arbitrary caller data kept verbatim on the record.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: FnMut(&E) + 'static,
    {
        self.callback = Some(Box::new(f));
        self
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl<E: Event> Default for Descriptor<E> {
    fn default() -> Self {
        Self::new()
    }
}
