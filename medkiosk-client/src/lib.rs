//! # medkiosk-client
//!
//! Data access for the medkiosk device.
//!
//! This crate provides:
//! - Domain records as served by the remote data service
//! - The `DataService` trait the workflow is written against
//! - A blocking REST/JSON implementation of it

pub mod client;
pub mod error;
pub mod models;
pub mod service;

pub use client::{ClientConfig, HttpDataService, DEFAULT_TIMEOUT};
pub use error::{ClientError, FailureKind};
pub use models::{Assessment, AssessmentResult, ItemList, Patient, Provider, ReviewFlag, RfidTag};
pub use service::DataService;
