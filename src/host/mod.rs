//! Host Module - services injected from the embedding environment
//!
//! - **Clock** - monotonic milliseconds
//! - **Scheduler** - request/cancel animation frames
//! - **Viewport** - size, width class, resize notifications
//! - **Element** - native listener bindings
//! - **Context** - the bundle handed to component constructors

mod clock;
mod context;
mod element;
mod scheduler;
mod viewport;

pub use clock::*;
pub use context::*;
pub use element::*;
pub use scheduler::*;
pub use viewport::*;
