//! Config Module - configuration merging and responsive overrides

pub mod merge;
pub mod responsive;

pub use merge::{deep_merge, merged};
pub use responsive::{resolve, Breakpoint, BreakpointToken, ResponsiveRule, RESPONSIVE_KEY};
