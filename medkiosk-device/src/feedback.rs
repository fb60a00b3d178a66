//! Tones, colours and durations used for user feedback.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An RGB colour for the light strip. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
}

/// Light strip colours per meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Waiting for a badge.
    pub idle: Rgb,
    pub success: Rgb,
    pub error: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            idle: Rgb::YELLOW,
            success: Rgb::GREEN,
            error: Rgb::RED,
        }
    }
}

/// The complete feedback table.
///
/// Built once from configuration and handed to the workflow; never changed
/// at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackProfile {
    /// Success tone (C5).
    pub success_hz: u32,
    /// Error tone (C3).
    pub error_hz: u32,
    /// Welcome chime, played in order (C5, E5, G5).
    pub chime_hz: Vec<u32>,
    pub chime_note_ms: u64,
    pub chime_gap_ms: u64,
    /// Access denied: `denial_beeps` error tones of `denial_ms` each.
    pub denial_beeps: u32,
    pub denial_ms: u64,
    pub denial_gap_ms: u64,
    /// Success and error cue length.
    pub cue_ms: u64,
    /// Error tone length when marking an assessment reviewed fails.
    pub review_failure_ms: u64,
    /// The two alternating alarm tones.
    pub alarm_hz: [u32; 2],
    pub alarm_flash_ms: u64,
    pub alarm_gap_ms: u64,
    /// Pixels lit by every colour change.
    pub pixel_count: u16,
    pub palette: Palette,
}

impl Default for FeedbackProfile {
    fn default() -> Self {
        Self {
            success_hz: 523,
            error_hz: 131,
            chime_hz: vec![523, 659, 784],
            chime_note_ms: 200,
            chime_gap_ms: 100,
            denial_beeps: 2,
            denial_ms: 300,
            denial_gap_ms: 200,
            cue_ms: 200,
            review_failure_ms: 300,
            alarm_hz: [1200, 900],
            alarm_flash_ms: 200,
            alarm_gap_ms: 50,
            pixel_count: 8,
            palette: Palette::default(),
        }
    }
}

impl FeedbackProfile {
    pub fn cue(&self) -> Duration {
        Duration::from_millis(self.cue_ms)
    }

    pub fn chime_gap(&self) -> Duration {
        Duration::from_millis(self.chime_gap_ms)
    }

    pub fn denial_gap(&self) -> Duration {
        Duration::from_millis(self.denial_gap_ms)
    }

    pub fn alarm_flash(&self) -> Duration {
        Duration::from_millis(self.alarm_flash_ms)
    }

    pub fn alarm_gap(&self) -> Duration {
        Duration::from_millis(self.alarm_gap_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tones() {
        let profile = FeedbackProfile::default();
        assert_eq!(profile.chime_hz, vec![523, 659, 784]);
        assert_eq!(profile.error_hz, 131);
        assert_eq!(profile.alarm_hz, [1200, 900]);
        assert_eq!(profile.pixel_count, 8);
        assert_eq!(profile.cue(), Duration::from_millis(200));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let profile: FeedbackProfile = serde_yaml::from_str(
            "success_hz: 440\npalette:\n  idle: [0, 0, 255]\n",
        )
        .unwrap();
        assert_eq!(profile.success_hz, 440);
        assert_eq!(profile.palette.idle, Rgb(0, 0, 255));
        assert_eq!(profile.palette.error, Rgb::RED);
        assert_eq!(profile.denial_beeps, 2);
    }
}
