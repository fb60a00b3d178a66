//! The patient review workflow: its screens, events and transition table.

use crate::alarm::AlarmSwitch;
use crate::config::Config;
use crate::controller::AssessmentController;
use crate::error::DeviceError;
use crate::peripherals::{ButtonPins, Peripherals};
use medkiosk_client::DataService;
use medkiosk_fsm::{Button, SharedClock, StateMachine, Timer};

/// Workflow states. The discriminant is the state number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    InitialScreen = 0,
    Welcome = 1,
    FailedAuth = 2,
    PatientSelect = 3,
    DisplayAssessment = 4,
}

/// Button names. Each raises `<name>_press`.
pub mod buttons {
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";
    pub const SELECT: &str = "select";
    pub const BACK: &str = "back";
}

/// Name of the single workflow timer.
pub const TIMER: &str = "timer";

/// Event names.
pub mod events {
    pub const LEFT_PRESS: &str = "left_press";
    pub const RIGHT_PRESS: &str = "right_press";
    pub const SELECT_PRESS: &str = "select_press";
    pub const BACK_PRESS: &str = "back_press";
    pub const TIMER_TIMEOUT: &str = "timer_timeout";
    pub const OK_CARD: &str = "ok_card";
    pub const FAILED_CARD: &str = "failed_card";
}

/// The workflow engine type.
pub type Kiosk<D> = StateMachine<AssessmentController<D>>;

/// Wires the workflow: buttons, the timer, the card outcome events and the
/// transition table, around a controller that owns `data` and `io`.
pub fn build<D: DataService>(
    data: D,
    io: Peripherals,
    pins: ButtonPins,
    config: &Config,
    clock: SharedClock,
    alarm: AlarmSwitch,
) -> Result<Kiosk<D>, DeviceError> {
    use events::*;
    use Screen::*;

    let timer = Timer::new(TIMER, clock.clone());
    let controller = AssessmentController::new(
        data,
        io,
        config,
        timer.clone(),
        clock.clone(),
        alarm,
    );

    let mut kiosk = StateMachine::new(controller, clock)
        .with_tick_interval(config.timing.tick_interval());

    let debounce = config.timing.debounce();
    let ButtonPins {
        mut left,
        mut right,
        mut select,
        mut back,
    } = pins;
    kiosk.add_button(Button::new(buttons::LEFT, move || left.is_active()).with_debounce(debounce))?;
    kiosk.add_button(Button::new(buttons::RIGHT, move || right.is_active()).with_debounce(debounce))?;
    kiosk.add_button(Button::new(buttons::SELECT, move || select.is_active()).with_debounce(debounce))?;
    kiosk.add_button(Button::new(buttons::BACK, move || back.is_active()).with_debounce(debounce))?;
    kiosk.add_timer(timer)?;
    kiosk.add_custom_event(OK_CARD)?;
    kiosk.add_custom_event(FAILED_CARD)?;

    kiosk.add_transition(InitialScreen, [OK_CARD], Welcome)?;
    kiosk.add_transition(InitialScreen, [TIMER_TIMEOUT, FAILED_CARD], FailedAuth)?;
    kiosk.add_transition(FailedAuth, [TIMER_TIMEOUT], InitialScreen)?;
    kiosk.add_transition(Welcome, [TIMER_TIMEOUT], PatientSelect)?;
    kiosk.add_transition(PatientSelect, [SELECT_PRESS], DisplayAssessment)?;
    kiosk.add_transition(PatientSelect, [TIMER_TIMEOUT], InitialScreen)?;
    kiosk.add_transition(DisplayAssessment, [BACK_PRESS, TIMER_TIMEOUT], PatientSelect)?;

    tracing::debug!(transitions = kiosk.table().len(), "workflow wired");
    Ok(kiosk)
}
