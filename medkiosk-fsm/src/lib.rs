//! # medkiosk-fsm
//!
//! Cooperative state machine engine for medkiosk.
//!
//! This crate provides:
//! - Debounced, edge-triggered buttons and one-shot timers as event sources
//! - An ordered transition table with duplicate detection
//! - The single-threaded run loop that polls sources, resolves transitions
//!   and drives a [`StateHandler`]
//! - A clock abstraction so the loop can run on virtual time

pub mod button;
pub mod clock;
pub mod definition;
pub mod engine;
pub mod error;
pub mod event;
pub mod handler;
pub mod timer;

pub use button::{Button, InputPin};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use definition::{StateId, Transition, TransitionTable};
pub use engine::{EngineStats, StateMachine};
pub use error::CoreError;
pub use event::{Event, EventSource};
pub use handler::{Context, StateHandler, StopHandle};
pub use timer::Timer;
