//! Peripheral contracts consumed by the workflow.
//!
//! Drivers for real hardware live outside this crate; the console simulator
//! in [`crate::console`] and the test doubles implement the same traits.

use crate::error::DeviceError;
use crate::feedback::Rgb;
use medkiosk_fsm::InputPin;
use std::time::Duration;

/// Characters per display line.
pub const LINE_WIDTH: usize = 16;

/// Lines on the display.
pub const LINE_COUNT: usize = 2;

/// A two-line character display.
pub trait TextDisplay: Send {
    fn clear(&mut self) -> Result<(), DeviceError>;

    /// Writes `text` to `line`, truncated to [`LINE_WIDTH`] characters.
    fn show_text(&mut self, text: &str, line: usize) -> Result<(), DeviceError>;
}

/// A piezo buzzer.
pub trait Buzzer: Send {
    /// Sounds a tone and blocks until it ends.
    fn beep(&mut self, hz: u32, duration: Duration) -> Result<(), DeviceError>;

    /// Starts a continuous tone. Returns immediately.
    fn play(&mut self, hz: u32) -> Result<(), DeviceError>;

    fn stop(&mut self) -> Result<(), DeviceError>;
}

/// An addressable RGB light strip.
pub trait LightStrip: Send {
    /// Lights the first `pixels` pixels in `color`.
    fn set_color(&mut self, color: Rgb, pixels: u16) -> Result<(), DeviceError>;

    fn off(&mut self) -> Result<(), DeviceError>;
}

/// An RFID badge reader.
pub trait RfidReader: Send {
    /// Non-blocking poll. Returns the card code of a badge in range, if any.
    fn tag_id(&mut self) -> Option<String>;
}

/// Output devices and the badge reader, owned by the workflow.
pub struct Peripherals {
    pub display: Box<dyn TextDisplay>,
    pub buzzer: Box<dyn Buzzer>,
    pub lights: Box<dyn LightStrip>,
    pub rfid: Box<dyn RfidReader>,
}

/// Pins behind the four navigation buttons. These go to the engine, not the
/// workflow.
pub struct ButtonPins {
    pub left: Box<dyn InputPin>,
    pub right: Box<dyn InputPin>,
    pub select: Box<dyn InputPin>,
    pub back: Box<dyn InputPin>,
}

/// Truncates `text` to the display width.
pub fn fit_line(text: &str) -> &str {
    match text.char_indices().nth(LINE_WIDTH) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Checks a line index against the display size.
pub fn check_line(line: usize) -> Result<(), DeviceError> {
    if line >= LINE_COUNT {
        return Err(DeviceError::peripheral(
            "display",
            format!("line {} out of range (0..{})", line, LINE_COUNT),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_line() {
        assert_eq!(fit_line("Please scan your"), "Please scan your");
        assert_eq!(fit_line("Lovelace, A., MD, PhD"), "Lovelace, A., MD");
        assert_eq!(fit_line(""), "");
        assert_eq!(fit_line("Müller-Lüdenscheidt, K."), "Müller-Lüdensche");
    }

    #[test]
    fn test_check_line() {
        assert!(check_line(0).is_ok());
        assert!(check_line(1).is_ok());
        assert!(matches!(
            check_line(2),
            Err(DeviceError::Peripheral { device: "display", .. })
        ));
    }
}
