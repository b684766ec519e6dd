//! Scenario tests for the component substrate.
//!
//! Builds a small popup widget the way a consumer would: a Module for props,
//! listeners and lifecycle, plus a Timeline for the open/close animation,
//! all driven by a headless host.
//!
//! Run with: cargo test --test substrate -- --nocapture

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use spark_motion::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// POPUP WIDGET
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum PopupEvent {
    PropsChanged,
    Destroyed,
    Show,
    Hide,
    Key { key: String, at: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopupKind {
    PropsChanged,
    Destroyed,
    Show,
    Hide,
    Key,
}

impl Event for PopupEvent {
    type Kind = PopupKind;

    fn kind(&self) -> PopupKind {
        match self {
            PopupEvent::PropsChanged => PopupKind::PropsChanged,
            PopupEvent::Destroyed => PopupKind::Destroyed,
            PopupEvent::Show => PopupKind::Show,
            PopupEvent::Hide => PopupKind::Hide,
            PopupEvent::Key { .. } => PopupKind::Key,
        }
    }
}

impl LifecycleEvent for PopupEvent {
    fn props_changed() -> Self {
        PopupEvent::PropsChanged
    }

    fn destroyed() -> Self {
        PopupEvent::Destroyed
    }
}

impl KeyInput for PopupEvent {
    fn key(&self) -> Option<&str> {
        match self {
            PopupEvent::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    fn timestamp(&self) -> f64 {
        match self {
            PopupEvent::Key { at, .. } => *at,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PopupProps {
    duration: f64,
    offset: f64,
}

impl Default for PopupProps {
    fn default() -> Self {
        Self {
            duration: 400.0,
            offset: 120.0,
        }
    }
}

struct Popup {
    module: Module<PopupEvent, PopupProps>,
    timeline: Timeline,
    position: Rc<Cell<f64>>,
}

impl Popup {
    fn new(host: &Headless, button: Rc<Element>, overrides: Value) -> Result<Self> {
        let module = Module::<PopupEvent, PopupProps>::builder(host.context())
            .name("popup")
            .props(overrides)
            .build()?;
        let props = module.props();

        let timeline = Timeline::new(
            host.context(),
            TimelineOptions::default()
                .duration(props.duration)
                .scope([props.offset, 0.0])
                .easing(Easing::CubicOut),
        );
        let position = Rc::new(Cell::new(props.offset));
        let pos = position.clone();
        timeline.on(TimelineKind::Progress, move |event| {
            if let Some(data) = event.data() {
                pos.set(data.scope_eased);
            }
        });

        let shown = module.downgrade();
        timeline.on(TimelineKind::End, move |event| {
            let Some(module) = shown.upgrade() else { return };
            if event.data().is_some_and(|d| d.progress >= 1.0) {
                module.dispatch(&PopupEvent::Show);
            } else {
                module.dispatch(&PopupEvent::Hide);
            }
        });

        let tl = timeline.clone();
        module.listener(button, "click", move |_| {
            if tl.is_playing() || tl.progress() >= 1.0 {
                tl.reverse();
            }
            tl.play(PlayOptions::default());
        });

        // Timeline goes with the module.
        let tl = timeline.clone();
        module.on(PopupKind::Destroyed, move |_| tl.destroy());

        Ok(Self {
            module,
            timeline,
            position,
        })
    }
}

fn run_frames(host: &Headless, from: f64, to: f64, step: f64) {
    let mut t = from;
    while t <= to {
        host.frame_at(t);
        t += step;
    }
}

// =============================================================================
// REGISTRY SCENARIOS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Ping {
    Progress(f64),
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PingKind {
    Progress,
    Show,
    OnceTest,
}

impl Event for Ping {
    type Kind = PingKind;

    fn kind(&self) -> PingKind {
        match self {
            Ping::Progress(_) => PingKind::Progress,
            Ping::Show => PingKind::Show,
        }
    }
}

#[test]
fn test_dispatch_by_target() {
    init_tracing();
    let registry = CallbackRegistry::<Ping>::named("scenario");
    let a_seen = Rc::new(RefCell::new(Vec::new()));
    let b_calls = Rc::new(Cell::new(0));

    let a = a_seen.clone();
    registry.on(PingKind::Progress, move |event| a.borrow_mut().push(event.clone()));
    let b = b_calls.clone();
    registry.on(PingKind::Show, move |_| b.set(b.get() + 1));

    let invoked = registry.dispatch_target(PingKind::Progress, &Ping::Progress(0.5));

    assert_eq!(invoked, 1);
    assert_eq!(*a_seen.borrow(), vec![Ping::Progress(0.5)]);
    assert_eq!(b_calls.get(), 0);
}

#[test]
fn test_once_record_fires_once() {
    init_tracing();
    let registry = CallbackRegistry::<Ping>::new();
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let id = registry
        .add(
            Descriptor::new()
                .target(PingKind::OnceTest)
                .once()
                .callback(move |_| c.set(c.get() + 1)),
        )
        .unwrap();

    registry.dispatch_target(PingKind::OnceTest, &Ping::Show);
    registry.dispatch_target(PingKind::OnceTest, &Ping::Show);

    assert_eq!(calls.get(), 1);
    assert!(!registry.contains(id));
    assert!(registry.is_empty());
}

#[test]
fn test_add_remove_round_trip() {
    let registry = CallbackRegistry::<Ping>::new();
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let id = registry.on(PingKind::Show, move |_| c.set(c.get() + 1)).unwrap();

    assert!(registry.remove(id));
    assert!(!registry.remove(id));
    registry.dispatch(&Ping::Show);
    registry.dispatch_all(&Ping::Show);
    assert_eq!(calls.get(), 0);
}

// =============================================================================
// WIDGET SCENARIOS
// =============================================================================

#[test]
fn test_popup_opens_and_closes() {
    init_tracing();
    let host = Headless::new();
    let button = Element::new("button");
    let popup = Popup::new(&host, button.clone(), json!({ "duration": 200 })).unwrap();

    let shows = Rc::new(Cell::new(0));
    let hides = Rc::new(Cell::new(0));
    let s = shows.clone();
    popup.module.on(PopupKind::Show, move |_| s.set(s.get() + 1));
    let h = hides.clone();
    popup.module.on(PopupKind::Hide, move |_| h.set(h.get() + 1));

    button.emit("click", Value::Null);
    run_frames(&host, 0.0, 300.0, 16.0);

    assert_eq!(shows.get(), 1);
    assert_eq!(popup.position.get(), 0.0);

    button.emit("click", Value::Null);
    run_frames(&host, 400.0, 700.0, 16.0);

    assert_eq!(hides.get(), 1);
    assert_eq!(popup.position.get(), 120.0);
    assert!(popup.timeline.is_completed());
}

#[test]
fn test_popup_destroy_releases_everything() {
    init_tracing();
    let host = Headless::new();
    let button = Element::new("button");
    let popup = Popup::new(&host, button.clone(), json!({})).unwrap();

    button.emit("click", Value::Null);
    host.frame_at(0.0);
    assert!(popup.timeline.is_playing());

    popup.module.destroy();

    assert!(popup.module.is_destroyed());
    assert!(popup.timeline.is_destroyed());
    assert_eq!(button.listener_count(), 0);
    assert!(host.frames.is_idle());

    button.emit("click", Value::Null);
    assert!(!popup.timeline.is_playing());
}

#[test]
fn test_responsive_popup_props() {
    init_tracing();
    let host = Headless::new();
    let button = Element::new("button");
    let popup = Popup::new(
        &host,
        button,
        json!({
            "offset": 200,
            "responsive": [
                { "breakpoint": "tablet", "settings": { "offset": 80 } },
                { "breakpoint": 500, "settings": { "offset": 40 } }
            ]
        }),
    )
    .unwrap();

    let widths = [1000.0, 400.0, 1920.0, 450.0, 800.0];
    let mut seen = Vec::new();
    for w in widths {
        host.viewport.resize(w, 900.0);
        seen.push(popup.module.props().offset);
    }
    assert_eq!(seen, vec![80.0, 40.0, 200.0, 40.0, 200.0]);

    // Any path to the same width ends in the same config.
    let other = Headless::new();
    let fresh = Module::<PopupEvent, PopupProps>::new(other.context(), popup.module.reference_config()).unwrap();
    other.viewport.resize(800.0, 900.0);
    assert_eq!(fresh.live_config(), popup.module.live_config());
}

#[test]
fn test_key_sequence_on_module() {
    let host = Headless::new();
    let module = Module::<PopupEvent, PopupProps>::new(host.context(), json!({})).unwrap();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    module.on(
        PopupKind::Key,
        KeySequence::new(["g", "g"], 300.0).callback(move |_: &PopupEvent| h.set(h.get() + 1)),
    );

    let press = |key: &str, at: f64| {
        module.dispatch(&PopupEvent::Key {
            key: key.to_string(),
            at,
        });
    };
    press("g", 0.0);
    press("g", 100.0);
    press("g", 1000.0);
    press("x", 1100.0);
    press("g", 1200.0);
    press("g", 1300.0);

    assert_eq!(hits.get(), 2);
}

#[test]
fn test_cascade_through_timeline_parent() {
    let host = Headless::new();
    let timeline = Timeline::new(host.context(), TimelineOptions::default());
    let child = Module::<ModuleEvent, Value>::builder(host.context())
        .parent(&timeline)
        .build()
        .unwrap();

    timeline.destroy();
    assert!(child.is_destroyed());
}

#[test]
fn test_panicking_subscriber_does_not_stop_playback() {
    init_tracing();
    let host = Headless::new();
    let timeline = Timeline::new(host.context(), TimelineOptions::default().duration(100.0));
    let after = Rc::new(Cell::new(0));

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    timeline.on(TimelineKind::Progress, |_| panic!("subscriber bug"));
    let a = after.clone();
    timeline.on(TimelineKind::Progress, move |_| a.set(a.get() + 1));

    timeline.play(PlayOptions::default());
    run_frames(&host, 0.0, 100.0, 25.0);

    std::panic::set_hook(previous);

    assert_eq!(after.get(), 5);
    assert!(timeline.is_completed());
}
