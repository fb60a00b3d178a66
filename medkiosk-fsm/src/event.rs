//! Event names.
//!
//! Events are plain names. Polled sources namespace theirs by source name:
//! a button called `select` raises `select_press`, a timer called `timer`
//! raises `timer_timeout`. Anything else is a custom event registered
//! explicitly with the engine.

use std::borrow::Borrow;
use std::fmt;

/// Suffix appended to a button name to form its press event.
pub const PRESS_SUFFIX: &str = "_press";

/// Suffix appended to a timer name to form its expiry event.
pub const TIMEOUT_SUFFIX: &str = "_timeout";

/// Name of the synthetic event passed to the initial state's enter hook.
pub const START: &str = "start";

/// A named event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Event(String);

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The press event for the button with the given name.
    pub fn press(button: &str) -> Self {
        Self(format!("{button}{PRESS_SUFFIX}"))
    }

    /// The expiry event for the timer with the given name.
    pub fn timeout(timer: &str) -> Self {
        Self(format!("{timer}{TIMEOUT_SUFFIX}"))
    }

    /// The event delivered when the engine enters its initial state.
    pub fn start() -> Self {
        Self(START.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Event {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Event {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for Event {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Event {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Event {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Where an event came from.
///
/// Within one tick events are dispatched in this order: every button in
/// registration order, then every timer in registration order, then custom
/// events in the order they were raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Button,
    Timer,
    Custom,
}
