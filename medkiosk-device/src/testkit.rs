//! Recording peripherals and a scripted data service for tests.

use crate::error::DeviceError;
use crate::feedback::Rgb;
use crate::peripherals::{
    check_line, fit_line, ButtonPins, Buzzer, LightStrip, Peripherals, RfidReader, TextDisplay,
    LINE_COUNT,
};
use medkiosk_client::{
    Assessment, AssessmentResult, ClientError, DataService, Patient, Provider, ReviewFlag, RfidTag,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One observable peripheral action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Clear,
    Text(usize, String),
    Beep(u32, Duration),
    Play(u32),
    Silence,
    Lights(Rgb, u16),
    LightsOff,
}

/// Shared log of everything the peripherals were asked to do.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<Output>>>,
    screen: Arc<Mutex<[String; LINE_COUNT]>>,
    failing_display: Arc<AtomicBool>,
}

impl Journal {
    fn push(&self, output: Output) {
        self.entries.lock().push(output);
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<Output> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// What the display currently shows.
    pub fn screen(&self) -> [String; LINE_COUNT] {
        self.screen.lock().clone()
    }

    /// Makes every display call fail from now on.
    pub fn break_display(&self) {
        self.failing_display.store(true, Ordering::SeqCst);
    }
}

/// Counts beeps at `hz` in a drained log.
pub fn beeps(outputs: &[Output], hz: u32) -> usize {
    outputs
        .iter()
        .filter(|o| matches!(o, Output::Beep(h, _) if *h == hz))
        .count()
}

struct RecordingDisplay(Journal);

impl TextDisplay for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DeviceError> {
        if self.0.failing_display.load(Ordering::SeqCst) {
            return Err(DeviceError::peripheral("display", "bus error"));
        }
        *self.0.screen.lock() = Default::default();
        self.0.push(Output::Clear);
        Ok(())
    }

    fn show_text(&mut self, text: &str, line: usize) -> Result<(), DeviceError> {
        check_line(line)?;
        let text = fit_line(text).to_string();
        self.0.screen.lock()[line] = text.clone();
        self.0.push(Output::Text(line, text));
        Ok(())
    }
}

struct RecordingBuzzer(Journal);

impl Buzzer for RecordingBuzzer {
    fn beep(&mut self, hz: u32, duration: Duration) -> Result<(), DeviceError> {
        self.0.push(Output::Beep(hz, duration));
        Ok(())
    }

    fn play(&mut self, hz: u32) -> Result<(), DeviceError> {
        self.0.push(Output::Play(hz));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.0.push(Output::Silence);
        Ok(())
    }
}

struct RecordingLights(Journal);

impl LightStrip for RecordingLights {
    fn set_color(&mut self, color: Rgb, pixels: u16) -> Result<(), DeviceError> {
        self.0.push(Output::Lights(color, pixels));
        Ok(())
    }

    fn off(&mut self) -> Result<(), DeviceError> {
        self.0.push(Output::LightsOff);
        Ok(())
    }
}

/// Badge reader fed by the test.
#[derive(Debug, Clone, Default)]
pub struct BadgeFeed(Arc<Mutex<VecDeque<String>>>);

impl BadgeFeed {
    pub fn scan(&self, code: &str) {
        self.0.lock().push_back(code.to_string());
    }
}

impl RfidReader for BadgeFeed {
    fn tag_id(&mut self) -> Option<String> {
        self.0.lock().pop_front()
    }
}

/// Recording peripherals plus the handles to inspect and drive them.
pub fn recording_peripherals() -> (Peripherals, Journal, BadgeFeed) {
    let journal = Journal::default();
    let badges = BadgeFeed::default();
    let io = Peripherals {
        display: Box::new(RecordingDisplay(journal.clone())),
        buzzer: Box::new(RecordingBuzzer(journal.clone())),
        lights: Box::new(RecordingLights(journal.clone())),
        rfid: Box::new(badges.clone()),
    };
    (io, journal, badges)
}

/// Button levels set by the test.
#[derive(Debug, Clone, Default)]
pub struct Keys {
    pub left: Arc<AtomicBool>,
    pub right: Arc<AtomicBool>,
    pub select: Arc<AtomicBool>,
    pub back: Arc<AtomicBool>,
}

impl Keys {
    pub fn pins(&self) -> ButtonPins {
        fn pin(level: &Arc<AtomicBool>) -> Box<dyn medkiosk_fsm::InputPin> {
            let level = level.clone();
            Box::new(move || level.load(Ordering::SeqCst))
        }
        ButtonPins {
            left: pin(&self.left),
            right: pin(&self.right),
            select: pin(&self.select),
            back: pin(&self.back),
        }
    }
}

/// In-memory data service.
#[derive(Debug, Default)]
pub struct ScriptedService {
    tags: Mutex<HashMap<String, RfidTag>>,
    providers: Mutex<HashMap<u64, Provider>>,
    patients: Mutex<HashMap<u64, Vec<Patient>>>,
    assessments: Mutex<HashMap<u64, Vec<Assessment>>>,
    offline: AtomicBool,
    reject_reviews: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_provider(&self, code: &str, provider: Provider) {
        self.tags.lock().insert(
            code.to_string(),
            RfidTag {
                provider_id: Some(provider.provider_id),
                card_code: code.to_string(),
                card_status: Some("ACTIVE".to_string()),
            },
        );
        self.providers.lock().insert(provider.provider_id, provider);
    }

    pub fn with_patients(&self, provider_id: u64, patients: Vec<Patient>) {
        self.patients.lock().insert(provider_id, patients);
    }

    pub fn with_assessments(&self, patient_id: u64, assessments: Vec<Assessment>) {
        self.assessments.lock().insert(patient_id, assessments);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn reject_reviews(&self, reject: bool) {
        self.reject_reviews.store(reject, Ordering::SeqCst);
    }

    /// Calls made so far, e.g. `patients/1`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> Result<(), ClientError> {
        self.calls.lock().push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl DataService for ScriptedService {
    fn post_assessments(&self) -> Result<(), ClientError> {
        self.record("post assessments".to_string())
    }

    fn rfid_tag(&self, code: &str) -> Result<RfidTag, ClientError> {
        self.record(format!("rfidtag/{code}"))?;
        self.tags
            .lock()
            .get(code)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("card {code}")))
    }

    fn provider(&self, provider_id: u64) -> Result<Provider, ClientError> {
        self.record(format!("provider/{provider_id}"))?;
        self.providers
            .lock()
            .get(&provider_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("provider {provider_id}")))
    }

    fn patients(&self, provider_id: u64) -> Result<Vec<Patient>, ClientError> {
        self.record(format!("patients/{provider_id}"))?;
        Ok(self.patients.lock().get(&provider_id).cloned().unwrap_or_default())
    }

    fn assessments(&self, patient_id: u64) -> Result<Vec<Assessment>, ClientError> {
        self.record(format!("assessments/{patient_id}"))?;
        Ok(self
            .assessments
            .lock()
            .get(&patient_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Reviewed assessments drop out of later listings.
    fn mark_reviewed(&self, assessment_id: u64) -> Result<(), ClientError> {
        self.record(format!("provider_reviewed/{assessment_id}"))?;
        if self.reject_reviews.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 400,
                message: "review rejected".to_string(),
            });
        }
        for list in self.assessments.lock().values_mut() {
            list.retain(|a| a.assessment_id != assessment_id);
        }
        Ok(())
    }
}

pub fn provider(id: u64, first: &str, last: &str, title: &str) -> Provider {
    Provider {
        provider_id: id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        title: title.to_string(),
        specialty: None,
    }
}

pub fn patient(id: u64, first: &str, last: &str) -> Patient {
    Patient {
        patient_id: id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        birth_date: None,
    }
}

pub fn assessment(id: u64, patient_id: u64, result: AssessmentResult, at: &str) -> Assessment {
    Assessment {
        assessment_id: id,
        patient_id,
        timestamp: at.to_string(),
        result,
        provider_id: Some(1),
        reviewed: ReviewFlag::Pending,
    }
}

/// `(assessment_id, result)` for a scripted assessment list.
pub type ScriptedAssessment = (u64, AssessmentResult);
