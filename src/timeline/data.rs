//! Per-tick timeline values and the events that carry them.

use serde::Serialize;

use crate::event::Event;
use crate::types::{clamp01, Span};

use super::easing::Easing;

/// Line, scope and easing of a timeline.
#[derive(Clone, Debug, Default)]
pub struct TimelineSettings {
    /// Window of absolute progress that moves line progress from 0 to 1.
    pub line: Span,
    /// Output range line and eased progress are mapped onto. May be descending.
    pub scope: Span,
    pub easing: Easing,
}

impl TimelineSettings {
    pub fn line(mut self, line: impl Into<Span>) -> Self {
        self.line = line.into();
        self
    }

    pub fn scope(mut self, scope: impl Into<Span>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// The five values a timeline derives from one driving ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TimelineData {
    /// Driving ratio, clamped to `[0, 1]`.
    pub progress: f64,
    /// `progress` remapped through the line window. Always in `[0, 1]`.
    pub line: f64,
    /// `line` through the easing function. In `[0, 1]` for built-in easings.
    pub eased: f64,
    /// `line` mapped onto the scope. Not clamped.
    pub scope: f64,
    /// `eased` mapped onto the scope. Not clamped.
    pub scope_eased: f64,
}

impl TimelineData {
    pub fn compute(ratio: f64, settings: &TimelineSettings) -> Self {
        let progress = clamp01(ratio);
        let line = settings.line.relative(progress);
        let eased = settings.easing.apply(line);
        Self {
            progress,
            line,
            eased,
            scope: settings.scope.lerp(line),
            scope_eased: settings.scope.lerp(eased),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
    /// `play()` started or resumed a run.
    Start,
    /// New values were computed, by a frame or by `imitate`.
    Progress(TimelineData),
    Pause,
    /// A run reached its boundary.
    End(TimelineData),
    Destroy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimelineKind {
    Start,
    Progress,
    Pause,
    End,
    Destroy,
}

impl Event for TimelineEvent {
    type Kind = TimelineKind;

    fn kind(&self) -> TimelineKind {
        match self {
            TimelineEvent::Start => TimelineKind::Start,
            TimelineEvent::Progress(_) => TimelineKind::Progress,
            TimelineEvent::Pause => TimelineKind::Pause,
            TimelineEvent::End(_) => TimelineKind::End,
            TimelineEvent::Destroy => TimelineKind::Destroy,
        }
    }
}

impl TimelineEvent {
    /// Values carried by `Progress` and `End`.
    pub fn data(&self) -> Option<&TimelineData> {
        match self {
            TimelineEvent::Progress(data) | TimelineEvent::End(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_settings() {
        let data = TimelineData::compute(0.5, &TimelineSettings::default());
        assert!(close(data.progress, 0.5));
        assert!(close(data.line, 0.5));
        assert!(close(data.eased, 0.5));
        assert!(close(data.scope, 0.5));
        assert!(close(data.scope_eased, 0.5));
    }

    #[test]
    fn test_line_window() {
        let settings = TimelineSettings::default().line([0.25, 0.75]);
        assert_eq!(TimelineData::compute(0.1, &settings).line, 0.0);
        assert!(close(TimelineData::compute(0.5, &settings).line, 0.5));
        assert_eq!(TimelineData::compute(0.9, &settings).line, 1.0);
    }

    #[test]
    fn test_scope_inversion() {
        let settings = TimelineSettings::default().scope([1.0, 0.0]);
        let mut prev = f64::INFINITY;
        for i in 0..=10 {
            let data = TimelineData::compute(i as f64 / 10.0, &settings);
            assert!(data.scope <= prev);
            prev = data.scope;
        }
        assert_eq!(TimelineData::compute(0.0, &settings).scope, 1.0);
        assert_eq!(TimelineData::compute(1.0, &settings).scope, 0.0);
    }

    #[test]
    fn test_scope_is_not_clamped() {
        let settings = TimelineSettings::default().scope([-100.0, 300.0]);
        let data = TimelineData::compute(0.25, &settings);
        assert!(close(data.scope, 0.0));
        assert_eq!(TimelineData::compute(1.0, &settings).scope, 300.0);
    }

    #[test]
    fn test_eased_scope() {
        let settings = TimelineSettings::default()
            .scope([0.0, 10.0])
            .easing(Easing::QuadIn);
        let data = TimelineData::compute(0.5, &settings);
        assert!(close(data.eased, 0.25));
        assert!(close(data.scope, 5.0));
        assert!(close(data.scope_eased, 2.5));
    }

    #[test]
    fn test_ratio_clamped() {
        let data = TimelineData::compute(1.7, &TimelineSettings::default());
        assert_eq!(data.progress, 1.0);
        assert_eq!(data.line, 1.0);
    }
}
