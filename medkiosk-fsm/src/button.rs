//! Debounced push buttons.

use crate::event::Event;
use std::fmt;
use std::time::Duration;

/// Default lockout window after an accepted level change.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(20);

/// A digital input. Returns true while the button is held down.
///
/// Pull-up wiring, active-low inversion and similar details belong to the
/// implementation.
pub trait InputPin: Send {
    fn is_active(&mut self) -> bool;
}

impl<F> InputPin for F
where
    F: FnMut() -> bool + Send,
{
    fn is_active(&mut self) -> bool {
        self()
    }
}

/// An edge-triggered, debounced button.
///
/// Debouncing is leading-edge with lockout: a level change is accepted
/// only when the previously accepted change is at least `debounce` old.
/// The press is reported on the accepted released-to-held edge, so a
/// press still held at the next poll is never lost however long the gap
/// between polls. Releases are accepted silently.
pub struct Button {
    name: String,
    event: Event,
    pin: Box<dyn InputPin>,
    debounce: Duration,
    pressed: bool,
    last_change: Option<Duration>,
    presses: u64,
}

impl Button {
    /// Creates a button whose press event is `<name>_press`.
    pub fn new(name: impl Into<String>, pin: impl InputPin + 'static) -> Self {
        let name = name.into();
        Self {
            event: Event::press(&name),
            name,
            pin: Box::new(pin),
            debounce: DEFAULT_DEBOUNCE,
            pressed: false,
            last_change: None,
            presses: 0,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn press_event(&self) -> &Event {
        &self.event
    }

    /// Debounced level as of the last poll.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Number of presses reported so far.
    pub fn press_count(&self) -> u64 {
        self.presses
    }

    /// Samples the pin. Returns true once per physical press.
    pub fn poll(&mut self, now: Duration) -> bool {
        let level = self.pin.is_active();
        if level == self.pressed {
            return false;
        }

        if let Some(last) = self.last_change {
            if now.saturating_sub(last) < self.debounce {
                return false;
            }
        }

        self.pressed = level;
        self.last_change = Some(now);
        if level {
            self.presses += 1;
            tracing::trace!(button = %self.name, "press");
        }
        level
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("name", &self.name)
            .field("debounce", &self.debounce)
            .field("pressed", &self.pressed)
            .finish()
    }
}
