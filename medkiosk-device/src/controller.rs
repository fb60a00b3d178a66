//! Lifecycle callbacks of the patient review workflow.

use crate::alarm::{self, AlarmSwitch};
use crate::config::{Config, TimingConfig};
use crate::cursor::{Paginated, Step};
use crate::error::DeviceError;
use crate::feedback::{FeedbackProfile, Rgb};
use crate::peripherals::Peripherals;
use crate::screens::{self, Lines};
use crate::workflow::{events, Screen};
use medkiosk_client::{Assessment, DataService, Patient, Provider};
use medkiosk_fsm::{Context, Event, SharedClock, StateHandler, Timer};
use std::time::Duration;

/// Drives the peripherals and the data service for each screen.
///
/// Holds the session: the scanned card, the authenticated provider and the
/// two paginated lists. Entering the badge prompt ends the session.
pub struct AssessmentController<D> {
    data: D,
    io: Peripherals,
    feedback: FeedbackProfile,
    timing: TimingConfig,
    timer: Timer,
    clock: SharedClock,
    alarm: AlarmSwitch,

    card: Option<String>,
    provider: Option<Provider>,
    patients: Paginated<Patient>,
    assessments: Paginated<Assessment>,
}

impl<D: DataService> AssessmentController<D> {
    pub fn new(
        data: D,
        io: Peripherals,
        config: &Config,
        timer: Timer,
        clock: SharedClock,
        alarm: AlarmSwitch,
    ) -> Self {
        Self {
            data,
            io,
            feedback: config.feedback.clone(),
            timing: config.timing.clone(),
            timer,
            clock,
            alarm,
            card: None,
            provider: None,
            patients: Paginated::default(),
            assessments: Paginated::default(),
        }
    }

    pub fn card(&self) -> Option<&str> {
        self.card.as_deref()
    }

    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }

    pub fn patients(&self) -> &Paginated<Patient> {
        &self.patients
    }

    pub fn assessments(&self) -> &Paginated<Assessment> {
        &self.assessments
    }

    pub fn alarm(&self) -> &AlarmSwitch {
        &self.alarm
    }

    // =========================================================================
    // Screens
    // =========================================================================

    fn render(&mut self, lines: &Lines) -> Result<(), DeviceError> {
        self.io.display.clear()?;
        self.io.lights.off()?;
        self.io.display.show_text(&lines.top, 0)?;
        self.io.display.show_text(&lines.bottom, 1)?;
        Ok(())
    }

    fn lights(&mut self, color: Rgb) -> Result<(), DeviceError> {
        self.io.lights.set_color(color, self.feedback.pixel_count)
    }

    /// Flashes `color` while sounding `hz` for `tone`, then goes dark.
    fn cue(&mut self, color: Rgb, hz: u32, tone: Duration) -> Result<(), DeviceError> {
        self.lights(color)?;
        self.io.buzzer.beep(hz, tone)?;
        self.clock.sleep(self.feedback.cue());
        self.io.lights.off()
    }

    fn success_cue(&mut self) -> Result<(), DeviceError> {
        self.cue(
            self.feedback.palette.success,
            self.feedback.success_hz,
            self.feedback.cue(),
        )
    }

    fn error_cue(&mut self) -> Result<(), DeviceError> {
        self.cue(
            self.feedback.palette.error,
            self.feedback.error_hz,
            self.feedback.cue(),
        )
    }

    fn show_scan_prompt(&mut self) -> Result<(), DeviceError> {
        self.render(&screens::scan_prompt())?;
        self.lights(self.feedback.palette.idle)
    }

    fn show_welcome(&mut self) -> Result<(), DeviceError> {
        let lines = match &self.provider {
            Some(provider) => screens::welcome(provider),
            None => Lines::new("Welcome!", ""),
        };
        self.render(&lines)?;

        let note = Duration::from_millis(self.feedback.chime_note_ms);
        for (i, hz) in self.feedback.chime_hz.clone().into_iter().enumerate() {
            if i > 0 {
                self.clock.sleep(self.feedback.chime_gap());
            }
            self.io.buzzer.beep(hz, note)?;
        }

        self.lights(self.feedback.palette.success)
    }

    fn show_access_denied(&mut self) -> Result<(), DeviceError> {
        self.render(&screens::access_denied())?;

        let tone = Duration::from_millis(self.feedback.denial_ms);
        for i in 0..self.feedback.denial_beeps {
            if i > 0 {
                self.clock.sleep(self.feedback.denial_gap());
            }
            self.io.buzzer.beep(self.feedback.error_hz, tone)?;
        }

        self.lights(self.feedback.palette.error)
    }

    fn show_patient(&mut self) -> Result<(), DeviceError> {
        match self.patients.current().map(screens::patient) {
            Some(lines) => self.render(&lines),
            None => {
                self.render(&screens::no_patients())?;
                self.error_cue()
            }
        }
    }

    /// Renders the current assessment and sets the alarm from its result.
    fn show_assessment(&mut self) -> Result<(), DeviceError> {
        let current = self
            .assessments
            .current()
            .map(|a| (screens::assessment(a), a.is_unhealthy()));

        match current {
            Some((lines, true)) => {
                self.alarm.arm();
                self.render(&lines)
            }
            Some((lines, false)) => {
                self.silence_alarm()?;
                self.render(&lines)
            }
            None => {
                self.silence_alarm()?;
                self.render(&screens::no_assessments())?;
                self.error_cue()
            }
        }
    }

    fn silence_alarm(&mut self) -> Result<(), DeviceError> {
        self.alarm.disarm();
        self.io.buzzer.stop()
    }

    // =========================================================================
    // Session
    // =========================================================================

    fn end_session(&mut self) {
        if let Some(provider) = self.provider.take() {
            tracing::info!(provider_id = provider.provider_id, "session ended");
        }
        self.card = None;
        self.patients.clear();
        self.assessments.clear();
    }

    fn submit_pending_assessments(&self) {
        if let Err(e) = self.data.post_assessments() {
            tracing::warn!(error = %e, kind = ?e.kind(), "failed to post assessments");
        }
    }

    /// Polls the reader once and raises the card outcome on a read.
    fn poll_badge(&mut self, cx: &mut Context<'_, Screen>) -> Result<(), DeviceError> {
        let code = match self.io.rfid.tag_id() {
            Some(code) if !code.is_empty() => code,
            _ => return Ok(()),
        };

        self.timer.cancel();
        self.card = Some(code.clone());

        match self.data.resolve_badge(&code) {
            Ok(provider) => {
                tracing::info!(
                    provider_id = provider.provider_id,
                    last_name = %provider.last_name,
                    "badge accepted"
                );
                self.provider = Some(provider);
                cx.process_event(events::OK_CARD);
            }
            Err(e) => {
                tracing::warn!(card = %code, error = %e, kind = ?e.kind(), "badge rejected");
                cx.process_event(events::FAILED_CARD);
            }
        }
        self.io.lights.off()
    }

    fn load_patients(&mut self) {
        let Some(provider_id) = self.provider.as_ref().map(|p| p.provider_id) else {
            self.patients.clear();
            return;
        };

        match self.data.patients(provider_id) {
            Ok(patients) => {
                tracing::debug!(provider_id, count = patients.len(), "patients loaded");
                self.patients.replace(patients);
            }
            Err(e) => {
                tracing::warn!(provider_id, error = %e, kind = ?e.kind(), "failed to load patients");
                self.patients.clear();
            }
        }
    }

    fn load_assessments(&mut self) {
        let Some(patient_id) = self.patients.current().map(|p| p.patient_id) else {
            self.assessments.clear();
            return;
        };

        match self.data.assessments(patient_id) {
            Ok(assessments) => {
                tracing::debug!(patient_id, count = assessments.len(), "assessments loaded");
                self.assessments.replace(assessments);
            }
            Err(e) => {
                tracing::warn!(patient_id, error = %e, kind = ?e.kind(), "failed to load assessments");
                self.assessments.clear();
            }
        }
    }

    /// Starts the auto-return countdown for an empty list.
    fn arm_empty_list_timer(&self, empty: bool) {
        if empty && !self.timer.is_running() {
            self.timer.start(self.timing.empty_list_timeout());
        }
    }

    // =========================================================================
    // In-state events
    // =========================================================================

    fn browse_patients(&mut self, step: Step) -> Result<(), DeviceError> {
        if self.patients.step(step) {
            self.show_patient()?;
            self.success_cue()
        } else {
            self.error_cue()
        }
    }

    fn browse_assessments(&mut self, step: Step) -> Result<(), DeviceError> {
        if self.assessments.step(step) {
            self.show_assessment()?;
            self.success_cue()
        } else {
            self.error_cue()
        }
    }

    fn review_current(&mut self, cx: &mut Context<'_, Screen>) -> Result<(), DeviceError> {
        let Some(assessment_id) = self.assessments.current().map(|a| a.assessment_id) else {
            return self.error_cue();
        };

        match self.data.mark_reviewed(assessment_id) {
            Ok(()) => {
                tracing::info!(assessment_id, "assessment marked reviewed");
                self.success_cue()?;
                cx.goto_state(Screen::DisplayAssessment, events::SELECT_PRESS);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(assessment_id, error = %e, kind = ?e.kind(), "failed to mark reviewed");
                self.cue(
                    self.feedback.palette.error,
                    self.feedback.error_hz,
                    Duration::from_millis(self.feedback.review_failure_ms),
                )
            }
        }
    }
}

fn step_for(event: &Event) -> Option<Step> {
    match event.as_str() {
        events::LEFT_PRESS => Some(Step::Back),
        events::RIGHT_PRESS => Some(Step::Forward),
        _ => None,
    }
}

impl<D: DataService> StateHandler for AssessmentController<D> {
    type State = Screen;
    type Error = DeviceError;

    fn state_entered(
        &mut self,
        _cx: &mut Context<'_, Screen>,
        state: Screen,
        event: &Event,
    ) -> Result<(), DeviceError> {
        tracing::info!(?state, %event, "screen entered");

        match state {
            Screen::InitialScreen => {
                self.submit_pending_assessments();
                self.end_session();
                let shown = self.show_scan_prompt();
                self.timer.start(self.timing.badge_timeout());
                shown
            }
            Screen::Welcome => {
                let shown = self.show_welcome();
                self.timer.start(self.timing.notice_timeout());
                shown
            }
            Screen::FailedAuth => {
                let shown = self.show_access_denied();
                self.timer.start(self.timing.notice_timeout());
                shown
            }
            Screen::PatientSelect => {
                self.load_patients();
                self.show_patient()
            }
            Screen::DisplayAssessment => {
                self.load_assessments();
                self.show_assessment()
            }
        }
    }

    fn state_left(
        &mut self,
        _cx: &mut Context<'_, Screen>,
        state: Screen,
        event: &Event,
    ) -> Result<(), DeviceError> {
        tracing::debug!(?state, %event, "screen left");

        if state == Screen::DisplayAssessment {
            self.timer.cancel();
            self.silence_alarm()?;
        }
        Ok(())
    }

    fn state_event(
        &mut self,
        cx: &mut Context<'_, Screen>,
        state: Screen,
        event: &Event,
    ) -> Result<bool, DeviceError> {
        match (state, step_for(event)) {
            (Screen::PatientSelect, Some(step)) => {
                self.browse_patients(step)?;
                Ok(true)
            }
            (Screen::DisplayAssessment, Some(step)) => {
                self.browse_assessments(step)?;
                Ok(true)
            }
            (Screen::DisplayAssessment, None) if event == events::SELECT_PRESS => {
                self.review_current(cx)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn state_do(&mut self, cx: &mut Context<'_, Screen>, state: Screen) -> Result<(), DeviceError> {
        match state {
            Screen::InitialScreen if self.card.is_none() => self.poll_badge(cx)?,
            Screen::PatientSelect => self.arm_empty_list_timer(self.patients.is_empty()),
            Screen::DisplayAssessment => {
                self.arm_empty_list_timer(self.assessments.is_empty());
                if self.alarm.is_armed() {
                    alarm::sound_once(
                        &self.alarm,
                        self.io.buzzer.as_mut(),
                        self.io.lights.as_mut(),
                        self.clock.as_ref(),
                        &self.feedback,
                    )?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
