//! Typed key-sequence accumulator.
//!
//! Matches a run of keys typed within an interval, e.g. `["g", "g"]` for
//! "go to top". The running buffer belongs to the one callback that owns the
//! `KeySequence`, not to the registry record.

use std::collections::VecDeque;

/// Events that carry a key press.
pub trait KeyInput {
    /// The pressed key, or `None` for events that are not key presses.
    fn key(&self) -> Option<&str>;

    /// Event time in milliseconds.
    fn timestamp(&self) -> f64;
}

/// Running buffer compared against an expected key sequence.
#[derive(Debug, Clone)]
pub struct KeySequence {
    keys: Vec<String>,
    interval: f64,
    buffer: VecDeque<String>,
    last_at: Option<f64>,
}

impl KeySequence {
    /// `interval` is the longest pause (ms) allowed between two keys.
    pub fn new<I, S>(keys: I, interval: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self {
            buffer: VecDeque::with_capacity(keys.len()),
            keys,
            interval,
            last_at: None,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Feed one key press. Returns true when the sequence completes.
    pub fn feed(&mut self, key: &str, at: f64) -> bool {
        if self.keys.is_empty() {
            return false;
        }

        if let Some(last) = self.last_at {
            if at - last > self.interval {
                self.buffer.clear();
            }
        }
        self.last_at = Some(at);

        if self.buffer.len() == self.keys.len() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(key.to_string());

        let matched = self.buffer.len() == self.keys.len()
            && self.buffer.iter().zip(&self.keys).all(|(a, b)| a == b);
        if matched {
            self.reset();
        }
        matched
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_at = None;
    }

    /// Wrap `handler` into a registry callback that runs once per completed sequence.
    pub fn callback<E, F>(mut self, mut handler: F) -> impl FnMut(&E) + 'static
    where
        E: KeyInput + 'static,
        F: FnMut(&E) + 'static,
    {
        move |event: &E| {
            if let Some(key) = event.key() {
                if self.feed(key, event.timestamp()) {
                    handler(event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Press(&'static str, f64);

    impl KeyInput for Press {
        fn key(&self) -> Option<&str> {
            Some(self.0)
        }

        fn timestamp(&self) -> f64 {
            self.1
        }
    }

    #[test]
    fn test_sequence_matches() {
        let mut seq = KeySequence::new(["g", "g"], 300.0);
        assert!(!seq.feed("g", 0.0));
        assert!(seq.feed("g", 100.0));
    }

    #[test]
    fn test_interval_resets_buffer() {
        let mut seq = KeySequence::new(["g", "g"], 300.0);
        assert!(!seq.feed("g", 0.0));
        assert!(!seq.feed("g", 1000.0));
        assert!(seq.feed("g", 1100.0));
    }

    #[test]
    fn test_overlapping_prefix() {
        let mut seq = KeySequence::new(["a", "a", "b"], 1000.0);
        assert!(!seq.feed("a", 0.0));
        assert!(!seq.feed("a", 1.0));
        assert!(!seq.feed("a", 2.0));
        assert!(seq.feed("b", 3.0));
    }

    #[test]
    fn test_empty_sequence_never_matches() {
        let mut seq = KeySequence::new(Vec::<String>::new(), 1000.0);
        assert!(!seq.feed("a", 0.0));
    }

    #[test]
    fn test_callback_adapter() {
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let mut cb = KeySequence::new(["x", "y"], 500.0)
            .callback(move |_: &Press| hits_clone.set(hits_clone.get() + 1));

        cb(&Press("x", 0.0));
        cb(&Press("y", 10.0));
        cb(&Press("y", 20.0));
        assert_eq!(hits.get(), 1);
    }
}
