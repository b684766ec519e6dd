//! # spark-motion
//!
//! Event and animation substrate for UI components.
//!
//! Every component is built from the same pieces:
//!
//! - a typed [`CallbackRegistry`] its consumers subscribe to
//! - a [`Module`] holding responsive props, native listeners, plugins, and a
//!   destroy cascade from an optional parent
//! - a [`Timeline`] when the component animates
//!
//! Host services (viewport, clock, frame scheduler) are passed in through a
//! [`Context`] instead of being reached through globals. [`Headless`] is a
//! fully manual host for tests and offline rendering.
//!
//! ## Modules
//!
//! - [`event`] - callback registry, event kinds, key sequences
//! - [`host`] - clock, frame scheduler, viewport, elements
//! - [`config`] - deep merge and responsive resolution
//! - [`module`] - the Module base and its capability traits
//! - [`timeline`] - progress computation, easing, playback
//!
//! ## Example
//!
//! ```ignore
//! use spark_motion::*;
//! use serde_json::json;
//!
//! let host = Headless::new();
//! let menu = Module::<ModuleEvent, MenuProps>::new(host.context(), json!({ "speed": 300 }))?;
//!
//! let tl = Timeline::new(host.context(), TimelineOptions::default().duration(300.0));
//! tl.on(TimelineKind::End, |_| println!("open"));
//! tl.play(PlayOptions::default());
//!
//! host.frame_at(0.0);
//! host.frame_at(300.0);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod module;
pub mod timeline;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

pub use event::{
    CallbackId, CallbackRegistry, Descriptor, Event, KeyInput, KeySequence, LifecycleEvent, Target,
};

pub use host::{
    Clock, Context, Element, EventTarget, FrameHandle, FrameLoop, FrameScheduler, Headless,
    HostEvent, ListenerOptions, ManualClock, Subscription, SystemClock, Viewport,
    ViewportBreakpoints, ViewportChange, ViewportEvent, ViewportMode, ViewportState,
};

pub use module::{
    Cascade, HasCallbacks, HasConfig, HasListeners, HasPlugins, ListenerHandle, ListenerSpec,
    Module, ModuleBuilder, ModuleEvent, Plugin, Props, WeakModule,
};

pub use timeline::{
    Easing, Imitate, PlayOptions, Timeline, TimelineBase, TimelineData, TimelineEvent,
    TimelineKind, TimelineOptions, TimelineSettings,
};
