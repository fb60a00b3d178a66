//! One-shot software timer.
//!
//! A [`Timer`] is a cheap cloneable handle: the engine keeps one clone to
//! poll, the state handler keeps another to arm and cancel. Both see the same
//! countdown.

use crate::clock::SharedClock;
use crate::event::Event;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Countdown {
    /// Absolute deadline on the shared clock; `None` when disarmed.
    deadline: Option<Duration>,
    /// Number of times this timer has expired.
    fired: u64,
}

/// A one-shot countdown that fires exactly once per `start`.
#[derive(Clone)]
pub struct Timer {
    name: Arc<str>,
    event: Event,
    countdown: Arc<Mutex<Countdown>>,
    clock: SharedClock,
}

impl Timer {
    /// Creates a disarmed timer. Its expiry event is `<name>_timeout`.
    pub fn new(name: &str, clock: SharedClock) -> Self {
        Self {
            name: Arc::from(name),
            event: Event::timeout(name),
            countdown: Arc::new(Mutex::new(Countdown::default())),
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event raised when this timer expires.
    pub fn timeout_event(&self) -> &Event {
        &self.event
    }

    /// Arms the timer to expire `duration` from now.
    ///
    /// Re-arming a running timer replaces its deadline; it never queues a
    /// second expiry. A deadline past the clock's range never expires.
    pub fn start(&self, duration: Duration) {
        let deadline = self.clock.now().saturating_add(duration);
        self.countdown.lock().deadline = Some(deadline);
        tracing::trace!(timer = %self.name, ?duration, "timer armed");
    }

    /// Arms the timer for a whole number of seconds.
    pub fn start_secs(&self, secs: u64) {
        self.start(Duration::from_secs(secs));
    }

    /// Disarms the timer without firing.
    pub fn cancel(&self) {
        if self.countdown.lock().deadline.take().is_some() {
            tracing::trace!(timer = %self.name, "timer cancelled");
        }
    }

    /// Returns true while armed and not yet expired.
    pub fn is_running(&self) -> bool {
        self.countdown.lock().deadline.is_some()
    }

    /// Time left before expiry, if armed.
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = self.countdown.lock().deadline?;
        Some(deadline.saturating_sub(self.clock.now()))
    }

    /// Number of expiries observed so far.
    pub fn fired_count(&self) -> u64 {
        self.countdown.lock().fired
    }

    /// Checks for expiry. Returns true exactly once per arming; the timer is
    /// disarmed by the call that reports it.
    pub fn poll(&self) -> bool {
        let now = self.clock.now();
        let mut countdown = self.countdown.lock();
        match countdown.deadline {
            Some(deadline) if now >= deadline => {
                countdown.deadline = None;
                countdown.fired += 1;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let countdown = self.countdown.lock();
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("deadline", &countdown.deadline)
            .field("fired", &countdown.fired)
            .finish()
    }
}
