//! State machine engine - registration, dispatch and the cooperative run loop.

use crate::button::Button;
use crate::clock::SharedClock;
use crate::definition::TransitionTable;
use crate::error::CoreError;
use crate::event::{Event, EventSource};
use crate::handler::{Context, Directives, StateHandler, StopHandle};
use crate::timer::Timer;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Default pause between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on back-to-back forced transitions requested by hooks.
const MAX_CHAINED_GOTOS: usize = 8;

/// Run loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub events: u64,
    pub transitions: u64,
    pub unhandled_events: u64,
    pub dropped_events: u64,
    pub hook_failures: u64,
    pub tick_panics: u64,
}

/// The state machine engine.
///
/// Owns the transition table, the polled event sources and the handler.
/// Everything runs on the caller's thread: [`run`](Self::run) is the
/// scheduler.
pub struct StateMachine<H: StateHandler> {
    /// Lifecycle callbacks.
    handler: H,

    /// Time source for polling and the inter-tick pause.
    clock: SharedClock,

    /// Transitions in registration order.
    table: TransitionTable<H::State>,

    /// Buttons in registration order.
    buttons: Vec<Button>,

    /// Timers in registration order.
    timers: Vec<Timer>,

    /// Every event name some source can raise.
    known_events: HashSet<Event>,

    /// Requests raised by callbacks.
    directives: Directives<H::State>,

    current: H::State,
    started: bool,
    tick_interval: Duration,
    stats: EngineStats,
}

impl<H: StateHandler> StateMachine<H> {
    /// Creates an engine in the initial state (`H::State::default()`).
    pub fn new(handler: H, clock: SharedClock) -> Self {
        Self {
            handler,
            clock,
            table: TransitionTable::new(),
            buttons: Vec::new(),
            timers: Vec::new(),
            known_events: HashSet::new(),
            directives: Directives::new(StopHandle::new()),
            current: H::State::default(),
            started: false,
            tick_interval: DEFAULT_TICK_INTERVAL,
            stats: EngineStats::default(),
        }
    }

    /// Sets the pause between ticks.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Uses an externally created stop handle.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.directives.stop = stop;
        self
    }

    // =========================================================================
    // Registration
    // =========================================================================

    fn ensure_configurable(&self, operation: &'static str) -> Result<(), CoreError> {
        if self.started {
            return Err(CoreError::AlreadyStarted { operation });
        }
        Ok(())
    }

    fn register_event(&mut self, event: &Event) -> Result<(), CoreError> {
        if event.is_empty() {
            return Err(CoreError::EmptyEventName);
        }
        if self.known_events.contains(event) {
            return Err(CoreError::DuplicateEventSource {
                event: event.to_string(),
            });
        }
        self.known_events.insert(event.clone());
        Ok(())
    }

    /// Registers a button. It raises `<name>_press`.
    pub fn add_button(&mut self, button: Button) -> Result<(), CoreError> {
        self.ensure_configurable("add a button")?;
        self.register_event(button.press_event())?;
        tracing::debug!(button = button.name(), "button registered");
        self.buttons.push(button);
        Ok(())
    }

    /// Registers a timer. It raises `<name>_timeout`.
    pub fn add_timer(&mut self, timer: Timer) -> Result<(), CoreError> {
        self.ensure_configurable("add a timer")?;
        self.register_event(timer.timeout_event())?;
        tracing::debug!(timer = timer.name(), "timer registered");
        self.timers.push(timer);
        Ok(())
    }

    /// Registers a custom event name that callbacks may raise.
    pub fn add_custom_event(&mut self, event: impl Into<Event>) -> Result<(), CoreError> {
        self.ensure_configurable("add a custom event")?;
        let event = event.into();
        self.register_event(&event)?;
        tracing::debug!(%event, "custom event registered");
        Ok(())
    }

    /// Registers a transition from `from` to `to` on any of `events`.
    ///
    /// Every event must already be registered. A `(from, event)` pair may be
    /// mapped only once; the first registration wins.
    pub fn add_transition<I, E>(&mut self, from: H::State, events: I, to: H::State) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Event>,
    {
        self.ensure_configurable("add a transition")?;
        let events: Vec<Event> = events.into_iter().map(Into::into).collect();
        if let Some(unknown) = events.iter().find(|e| !self.known_events.contains(*e)) {
            return Err(CoreError::UnknownEvent {
                event: unknown.to_string(),
            });
        }
        self.table.insert(from, &events, to)
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Queues a custom event for the next tick.
    pub fn process_event(&mut self, event: impl Into<Event>) {
        let event = event.into();
        if !self.directives.enqueue(event.clone()) {
            tracing::debug!(%event, "event already pending");
        }
    }

    /// Forces an immediate transition to `state`, bypassing the table.
    ///
    /// The leave hook of the current state and the enter hook of `state`
    /// run in that order, even when `state` is the current state.
    pub fn goto_state(&mut self, state: H::State, event: impl Into<Event>) {
        let event = event.into();
        self.transition(state, &event);
        self.apply_goto();
    }

    /// Runs the initial state's enter hook. Registration is closed from here
    /// on. Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        tracing::info!(
            state = ?self.current,
            buttons = self.buttons.len(),
            timers = self.timers.len(),
            transitions = self.table.len(),
            "state machine starting"
        );

        let state = self.current;
        let event = Event::start();
        let result =
            self.handler
                .state_entered(&mut Context::new(state, &mut self.directives), state, &event);
        if let Err(e) = result {
            self.hook_failed("state_entered", state, Some(&event), &e);
        }
        self.apply_goto();
    }

    /// Runs one tick: poll buttons, poll timers, drain custom events,
    /// dispatch everything in that order, then call the do hook once.
    pub fn tick(&mut self) {
        self.start();

        let now = self.clock.now();
        let mut fired = Vec::new();

        for button in &mut self.buttons {
            if button.poll(now) {
                fired.push((button.press_event().clone(), EventSource::Button));
            }
        }

        for timer in &self.timers {
            if timer.poll() {
                fired.push((timer.timeout_event().clone(), EventSource::Timer));
            }
        }

        while let Some(event) = self.directives.pending.pop_front() {
            if self.known_events.contains(&event) {
                fired.push((event, EventSource::Custom));
            } else {
                self.stats.dropped_events += 1;
                tracing::warn!(%event, "dropping unregistered event");
            }
        }

        for (event, source) in fired {
            self.dispatch(event, source);
        }

        let state = self.current;
        let result = self
            .handler
            .state_do(&mut Context::new(state, &mut self.directives), state);
        if let Err(e) = result {
            self.hook_failed("state_do", state, None, &e);
        }
        self.apply_goto();

        self.stats.ticks += 1;
    }

    /// Runs the loop until stopped.
    ///
    /// A panic inside a tick is logged and counted, and the loop carries on
    /// with the next tick.
    pub fn run(&mut self) {
        if !self.started {
            self.guarded(Self::start);
        }
        tracing::info!(interval = ?self.tick_interval, "run loop started");

        while !self.directives.stop.is_stopped() {
            self.guarded(Self::tick);
            self.clock.sleep(self.tick_interval);
        }

        tracing::info!(state = ?self.current, ticks = self.stats.ticks, "run loop stopped");
    }

    /// Requests the loop to stop after the tick in flight.
    pub fn stop(&self) {
        self.directives.stop.stop();
    }

    /// Returns a handle that can stop the loop from anywhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.directives.stop.clone()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn current_state(&self) -> H::State {
        self.current
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn table(&self) -> &TransitionTable<H::State> {
        &self.table
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Returns true if some registered source raises `event`.
    pub fn knows_event(&self, event: &str) -> bool {
        self.known_events.contains(event)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn dispatch(&mut self, event: Event, source: EventSource) {
        self.stats.events += 1;
        tracing::debug!(state = ?self.current, %event, ?source, "dispatching");

        match self.table.resolve(self.current, &event) {
            Some(to) => self.transition(to, &event),
            None => {
                let state = self.current;
                let result = self.handler.state_event(
                    &mut Context::new(state, &mut self.directives),
                    state,
                    &event,
                );
                match result {
                    Ok(true) => tracing::debug!(?state, %event, "event handled in state"),
                    Ok(false) => {
                        self.stats.unhandled_events += 1;
                        tracing::debug!(?state, %event, "event ignored");
                    }
                    Err(e) => self.hook_failed("state_event", state, Some(&event), &e),
                }
            }
        }

        self.apply_goto();
    }

    fn transition(&mut self, to: H::State, event: &Event) {
        let from = self.current;

        let result = self
            .handler
            .state_left(&mut Context::new(from, &mut self.directives), from, event);
        if let Err(e) = result {
            self.hook_failed("state_left", from, Some(event), &e);
        }

        self.current = to;
        self.stats.transitions += 1;
        tracing::info!(?from, ?to, %event, "transition");

        let result = self
            .handler
            .state_entered(&mut Context::new(to, &mut self.directives), to, event);
        if let Err(e) = result {
            self.hook_failed("state_entered", to, Some(event), &e);
        }
    }

    /// Performs forced transitions requested by hooks.
    fn apply_goto(&mut self) {
        for _ in 0..MAX_CHAINED_GOTOS {
            match self.directives.goto.take() {
                Some((state, event)) => {
                    tracing::debug!(?state, %event, "forced transition");
                    self.transition(state, &event);
                }
                None => return,
            }
        }

        if let Some((state, event)) = self.directives.goto.take() {
            tracing::warn!(?state, %event, "too many chained forced transitions; dropping request");
        }
    }

    fn hook_failed(&mut self, hook: &'static str, state: H::State, event: Option<&Event>, error: &H::Error) {
        self.stats.hook_failures += 1;
        tracing::error!(
            hook,
            ?state,
            event = event.map(Event::as_str).unwrap_or("-"),
            %error,
            "state hook failed"
        );
    }

    fn guarded(&mut self, step: fn(&mut Self)) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| step(self)));
        if let Err(payload) = outcome {
            self.stats.tick_panics += 1;
            tracing::error!(
                state = ?self.current,
                panic = panic_message(payload.as_ref()),
                "tick panicked; continuing"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
