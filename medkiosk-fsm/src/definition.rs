//! Transition table.
//!
//! Transitions are kept in registration order and resolved by a linear scan,
//! so resolution never depends on hash iteration order. Registration
//! rejects any `(from, event)` pair that is already mapped, which keeps the
//! first registration authoritative.

use crate::error::CoreError;
use crate::event::Event;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Bounds for a state identifier.
///
/// `Default` names the initial state.
pub trait StateId: Copy + Eq + Hash + Debug + Default + 'static {}

impl<T> StateId for T where T: Copy + Eq + Hash + Debug + Default + 'static {}

/// A transition in the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S> {
    /// Source state.
    pub from: S,

    /// Events that trigger this transition.
    pub events: Vec<Event>,

    /// Target state.
    pub to: S,
}

/// Ordered, duplicate-free set of transitions.
#[derive(Debug, Clone)]
pub struct TransitionTable<S> {
    transitions: Vec<Transition<S>>,
    keys: HashSet<(S, Event)>,
}

impl<S: StateId> Default for TransitionTable<S> {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            keys: HashSet::new(),
        }
    }
}

impl<S: StateId> TransitionTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transition. On error the table is left untouched.
    pub fn insert(&mut self, from: S, events: &[Event], to: S) -> Result<(), CoreError> {
        if events.is_empty() {
            return Err(CoreError::EmptyTriggers {
                state: format!("{from:?}"),
            });
        }

        let mut seen = HashSet::new();
        for event in events {
            if event.is_empty() {
                return Err(CoreError::EmptyEventName);
            }
            let key = (from, event.clone());
            if self.keys.contains(&key) || !seen.insert(key) {
                return Err(CoreError::DuplicateTransition {
                    state: format!("{from:?}"),
                    event: event.to_string(),
                });
            }
        }

        self.keys.extend(seen);
        self.transitions.push(Transition {
            from,
            events: events.to_vec(),
            to,
        });
        Ok(())
    }

    /// Looks up the target state for `event` in `state`.
    pub fn resolve(&self, state: S, event: &Event) -> Option<S> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.events.contains(event))
            .map(|t| t.to)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
