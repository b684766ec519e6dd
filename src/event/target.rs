//! Event kinds and dispatch targets.

use std::fmt;

/// A payload dispatched through a [`CallbackRegistry`](super::CallbackRegistry).
///
/// Each component defines one closed enum of payloads; `kind()` reports the
/// discriminant that callback targets are matched against.
pub trait Event: 'static {
    type Kind: Copy + Eq + fmt::Debug + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Payloads a [`Module`](crate::module::Module) dispatches on its own.
pub trait LifecycleEvent: Event {
    /// Dispatched after the module's live configuration changed.
    fn props_changed() -> Self;

    /// Dispatched at the start of module teardown.
    fn destroyed() -> Self;
}

/// Which dispatches a callback record responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<K> {
    /// Fires on every dispatch regardless of kind.
    Any,
    /// Fires only for dispatches of this kind.
    Only(K),
}

impl<K: PartialEq> Target<K> {
    /// Check whether a dispatch of `kind` reaches this target.
    #[inline]
    pub fn matches(&self, kind: &K) -> bool {
        match self {
            Target::Any => true,
            Target::Only(k) => k == kind,
        }
    }
}

impl<K> Default for Target<K> {
    fn default() -> Self {
        Target::Any
    }
}

impl<K> From<K> for Target<K> {
    fn from(kind: K) -> Self {
        Target::Only(kind)
    }
}
