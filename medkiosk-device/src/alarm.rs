//! Unhealthy-result alarm.

use crate::error::DeviceError;
use crate::feedback::FeedbackProfile;
use crate::peripherals::{Buzzer, LightStrip};
use medkiosk_fsm::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off flag for the alarm.
///
/// Clones share the flag, so another thread (the shutdown path) can silence
/// an alarm that the run loop is sounding.
#[derive(Debug, Clone, Default)]
pub struct AlarmSwitch {
    armed: Arc<AtomicBool>,
}

impl AlarmSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self) {
        if !self.armed.swap(true, Ordering::SeqCst) {
            tracing::info!("alarm armed");
        }
    }

    pub fn disarm(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            tracing::info!("alarm disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

/// Sounds one round of the alarm: each alarm tone in turn with a red flash.
///
/// The switch is checked before the round and after every pause. Once it
/// reads disarmed the buzzer is stopped and the round ends. Returns whether
/// the alarm is still armed.
pub fn sound_once(
    switch: &AlarmSwitch,
    buzzer: &mut dyn Buzzer,
    lights: &mut dyn LightStrip,
    clock: &dyn Clock,
    feedback: &FeedbackProfile,
) -> Result<bool, DeviceError> {
    for hz in feedback.alarm_hz {
        if !switch.is_armed() {
            buzzer.stop()?;
            return Ok(false);
        }

        buzzer.play(hz)?;
        lights.set_color(feedback.palette.error, feedback.pixel_count)?;
        clock.sleep(feedback.alarm_flash());
        lights.off()?;

        if !switch.is_armed() {
            buzzer.stop()?;
            return Ok(false);
        }
        clock.sleep(feedback.alarm_gap());
    }

    if !switch.is_armed() {
        buzzer.stop()?;
        return Ok(false);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{recording_peripherals, Output};
    use medkiosk_fsm::ManualClock;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Disarms the switch during the n-th sleep.
    struct DisarmingClock {
        inner: ManualClock,
        switch: AlarmSwitch,
        after: usize,
        sleeps: Mutex<usize>,
    }

    impl Clock for DisarmingClock {
        fn now(&self) -> Duration {
            self.inner.now()
        }

        fn sleep(&self, duration: Duration) {
            self.inner.sleep(duration);
            let mut sleeps = self.sleeps.lock();
            *sleeps += 1;
            if *sleeps == self.after {
                self.switch.disarm();
            }
        }
    }

    #[test]
    fn test_full_round() {
        let (mut io, journal, _) = recording_peripherals();
        let clock = ManualClock::new();
        let switch = AlarmSwitch::new();
        let feedback = FeedbackProfile::default();
        switch.arm();

        let armed = sound_once(&switch, io.buzzer.as_mut(), io.lights.as_mut(), &clock, &feedback).unwrap();
        assert!(armed);
        assert_eq!(clock.total_slept(), Duration::from_millis(500));

        let red = Output::Lights(feedback.palette.error, 8);
        assert_eq!(
            journal.take(),
            vec![
                Output::Play(1200),
                red.clone(),
                Output::LightsOff,
                Output::Play(900),
                red,
                Output::LightsOff,
            ]
        );
    }

    #[test]
    fn test_disarmed_switch_only_silences() {
        let (mut io, journal, _) = recording_peripherals();
        let clock = ManualClock::new();
        let armed = sound_once(
            &AlarmSwitch::new(),
            io.buzzer.as_mut(),
            io.lights.as_mut(),
            &clock,
            &FeedbackProfile::default(),
        )
        .unwrap();
        assert!(!armed);
        assert_eq!(journal.take(), vec![Output::Silence]);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[test]
    fn test_disarm_mid_round_stops_after_that_step() {
        let (mut io, journal, _) = recording_peripherals();
        let switch = AlarmSwitch::new();
        switch.arm();
        let clock = DisarmingClock {
            inner: ManualClock::new(),
            switch: switch.clone(),
            after: 1,
            sleeps: Mutex::new(0),
        };

        let armed = sound_once(
            &switch,
            io.buzzer.as_mut(),
            io.lights.as_mut(),
            &clock,
            &FeedbackProfile::default(),
        )
        .unwrap();

        assert!(!armed);
        let outputs = journal.take();
        assert_eq!(outputs.last(), Some(&Output::Silence));
        assert!(!outputs.contains(&Output::Play(900)));
        assert_eq!(*clock.sleeps.lock(), 1);
    }

    #[test]
    fn test_switch_is_shared() {
        let switch = AlarmSwitch::new();
        let remote = switch.clone();
        switch.arm();
        assert!(remote.is_armed());
        remote.disarm();
        assert!(!switch.is_armed());
    }
}
