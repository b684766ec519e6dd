//! Timeline engine
//!
//! - [`TimelineBase`] - derives five progress values from one ratio and
//!   drives nested timelines
//! - [`Timeline`] - frame-driven playback: play, pause, reverse, reset
//! - [`Easing`] - easing curves for the eased values
//!
//! # Example
//!
//! ```ignore
//! let tl = Timeline::new(ctx.clone(), TimelineOptions::default().duration(400.0).scope([0.0, 240.0]));
//! tl.on(TimelineKind::Progress, move |event| {
//!     if let Some(data) = event.data() {
//!         panel.set_offset(data.scope_eased);
//!     }
//! });
//! tl.play(PlayOptions::default().easing(Easing::CubicOut));
//! ```

mod base;
mod data;
mod easing;
mod playback;

pub use base::{Imitate, TimelineBase};
pub use data::{TimelineData, TimelineEvent, TimelineKind, TimelineSettings};
pub use easing::Easing;
pub use playback::{PlayOptions, Timeline, TimelineOptions};
