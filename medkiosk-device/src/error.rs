//! Device error types.

use crate::config::ConfigError;
use medkiosk_client::ClientError;
use medkiosk_fsm::CoreError;
use thiserror::Error;

/// Device errors.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state machine error: {0}")]
    Core(#[from] CoreError),

    #[error("data service error: {0}")]
    Client(#[from] ClientError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{device} failure: {message}")]
    Peripheral { device: &'static str, message: String },
}

impl DeviceError {
    pub fn peripheral(device: &'static str, message: impl Into<String>) -> Self {
        DeviceError::Peripheral {
            device,
            message: message.into(),
        }
    }

    /// Returns whether this error should abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::Core(_) | DeviceError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classes() {
        let err = DeviceError::from(CoreError::EmptyEventName);
        assert!(err.is_fatal());
        assert!(!DeviceError::peripheral("display", "bus timeout").is_fatal());
        assert_eq!(
            DeviceError::peripheral("buzzer", "stuck").to_string(),
            "buzzer failure: stuck"
        );
    }
}
