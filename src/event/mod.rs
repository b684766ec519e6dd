//! Event Module - Callback registry and event kinds
//!
//! Every component dispatches through a [`CallbackRegistry`]. Callbacks are
//! registered against a [`Target`] (one event kind, or [`Target::Any`]) and
//! identified by a [`CallbackId`] that is never reused.
//!
//! # Example
//!
//! ```ignore
//! use spark_motion::event::{CallbackRegistry, Descriptor, Event};
//!
//! let registry = CallbackRegistry::<PopupEvent>::named("popup");
//! let id = registry
//!     .add(Descriptor::on(PopupKind::Show, |_| println!("shown")).once())
//!     .expect("descriptor has a callback");
//!
//! registry.dispatch(&PopupEvent::Show);
//! registry.remove(id); // false: once-records remove themselves
//! ```

mod descriptor;
mod registry;
mod sequence;
mod target;

pub use descriptor::*;
pub use registry::*;
pub use sequence::*;
pub use target::*;
