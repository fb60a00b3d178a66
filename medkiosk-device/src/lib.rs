//! # medkiosk-device
//!
//! The kiosk itself: the patient review workflow on top of the state
//! machine engine.
//!
//! This crate provides:
//! - Configuration loading (YAML file plus environment overrides)
//! - Peripheral contracts and a console simulator implementing them
//! - The workflow controller, its screens and the unhealthy-result alarm

pub mod alarm;
pub mod config;
pub mod console;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod feedback;
pub mod peripherals;
pub mod screens;
pub mod workflow;

#[cfg(test)]
mod testkit;

pub use alarm::AlarmSwitch;
pub use config::{Config, ConfigError, ServiceConfig, TimingConfig};
pub use console::console_kiosk;
pub use controller::AssessmentController;
pub use cursor::{Paginated, Step};
pub use error::DeviceError;
pub use feedback::{FeedbackProfile, Palette, Rgb};
pub use peripherals::{ButtonPins, Buzzer, LightStrip, Peripherals, RfidReader, TextDisplay};
pub use workflow::{build, Kiosk, Screen};
