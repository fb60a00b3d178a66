//! Lifecycle callbacks and the context they run in.

use crate::definition::StateId;
use crate::event::Event;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle callbacks for the states of one machine.
///
/// The engine calls exactly one of these at a time. Failures are logged by
/// the engine and never stop the run loop.
pub trait StateHandler {
    type State: StateId;
    type Error: std::error::Error;

    /// Called after the machine moves into `state` because of `event`.
    fn state_entered(
        &mut self,
        cx: &mut Context<'_, Self::State>,
        state: Self::State,
        event: &Event,
    ) -> Result<(), Self::Error>;

    /// Called before the machine moves out of `state` because of `event`.
    fn state_left(
        &mut self,
        _cx: &mut Context<'_, Self::State>,
        _state: Self::State,
        _event: &Event,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for an event that no transition from `state` consumes.
    ///
    /// The return value says whether the handler acted on the event. It is
    /// used for diagnostics only and never changes the flow of the machine.
    fn state_event(
        &mut self,
        _cx: &mut Context<'_, Self::State>,
        _state: Self::State,
        _event: &Event,
    ) -> Result<bool, Self::Error> {
        Ok(false)
    }

    /// Called once per tick, after all of the tick's events are dispatched.
    fn state_do(
        &mut self,
        _cx: &mut Context<'_, Self::State>,
        _state: Self::State,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Thread-safe request to leave the run loop.
///
/// The loop checks the flag at the top of each tick, so the tick in flight
/// always completes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Requests raised by callbacks, applied by the engine.
#[derive(Debug)]
pub(crate) struct Directives<S> {
    pub(crate) pending: VecDeque<Event>,
    pub(crate) goto: Option<(S, Event)>,
    pub(crate) stop: StopHandle,
}

impl<S> Directives<S> {
    pub(crate) fn new(stop: StopHandle) -> Self {
        Self {
            pending: VecDeque::new(),
            goto: None,
            stop,
        }
    }

    pub(crate) fn enqueue(&mut self, event: Event) -> bool {
        if self.pending.contains(&event) {
            return false;
        }
        self.pending.push_back(event);
        true
    }
}

/// What a callback may ask of the engine while it runs.
pub struct Context<'a, S> {
    state: S,
    directives: &'a mut Directives<S>,
}

impl<'a, S: StateId> Context<'a, S> {
    pub(crate) fn new(state: S, directives: &'a mut Directives<S>) -> Self {
        Self { state, directives }
    }

    /// The machine's current state.
    pub fn state(&self) -> S {
        self.state
    }

    /// Raises a custom event. It is dispatched on the next tick, after that
    /// tick's buttons and timers. Raising an event that is already pending
    /// has no effect.
    pub fn process_event(&mut self, event: impl Into<Event>) {
        let event = event.into();
        if !self.directives.enqueue(event.clone()) {
            tracing::debug!(%event, "event already pending");
        }
    }

    /// Forces a transition to `state`, bypassing the table.
    ///
    /// The engine performs it as soon as the current callback returns and
    /// before anything else happens: the leave hook of the current state,
    /// then the enter hook of `state`, each exactly once. A later request in
    /// the same callback replaces an earlier one.
    pub fn goto_state(&mut self, state: S, event: impl Into<Event>) {
        self.directives.goto = Some((state, event.into()));
    }

    /// Requests the run loop to stop after the current tick.
    pub fn stop(&self) {
        self.directives.stop.stop();
    }
}
