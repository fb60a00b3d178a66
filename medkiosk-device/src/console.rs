//! Terminal stand-ins for the kiosk hardware.
//!
//! The display is drawn on stdout, buzzer and lights are logged, and a
//! reader thread turns stdin lines into button presses and badge scans:
//!
//! ```text
//! l | r | s | b     press left / right / select / back
//! t <code>          scan a badge
//! q                 quit
//! ```

use crate::error::DeviceError;
use crate::feedback::Rgb;
use crate::peripherals::{
    check_line, fit_line, ButtonPins, Buzzer, LightStrip, Peripherals, RfidReader, TextDisplay,
    LINE_COUNT, LINE_WIDTH,
};
use medkiosk_fsm::{InputPin, SharedClock, StopHandle};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Press(Key),
    Scan(String),
    Quit,
}

/// The four navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Select,
    Back,
}

/// Parses one input line. Returns `None` for anything unrecognised.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()?.to_ascii_lowercase().as_str() {
        "l" | "left" => Command::Press(Key::Left),
        "r" | "right" => Command::Press(Key::Right),
        "s" | "select" => Command::Press(Key::Select),
        "b" | "back" => Command::Press(Key::Back),
        "t" | "tag" => Command::Scan(words.next()?.to_string()),
        "q" | "quit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[derive(Debug, Default)]
struct InputState {
    presses: HashMap<Key, u32>,
    badges: VecDeque<String>,
}

/// Queued console input shared between the reader thread and the pins.
#[derive(Debug, Clone)]
pub struct ConsoleInput {
    state: Arc<Mutex<InputState>>,
    stop: StopHandle,
}

impl ConsoleInput {
    pub fn new(stop: StopHandle) -> Self {
        Self {
            state: Arc::new(Mutex::new(InputState::default())),
            stop,
        }
    }

    /// Applies a command.
    pub fn apply(&self, command: Command) {
        match command {
            Command::Press(key) => {
                *self.state.lock().presses.entry(key).or_default() += 1;
            }
            Command::Scan(code) => self.state.lock().badges.push_back(code),
            Command::Quit => self.stop.stop(),
        }
    }

    /// Reads stdin on a background thread until `q` or end of input, both of
    /// which stop the machine.
    pub fn spawn_reader(&self) -> Result<(), DeviceError> {
        let input = self.clone();
        std::thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            tracing::warn!(error = %e, "console read failed");
                            break;
                        }
                    };
                    match parse_command(&line) {
                        Some(command) => {
                            let quit = command == Command::Quit;
                            input.apply(command);
                            if quit {
                                return;
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => tracing::warn!(input = %line, "unknown command (l, r, s, b, t <code>, q)"),
                    }
                }
                input.stop.stop();
            })?;
        Ok(())
    }

    /// A pin that reports queued presses of `key`.
    ///
    /// Each press holds the level high for `hold`, then low for `hold`, so
    /// a button debounced by at most `hold` sees every queued press.
    pub fn pin(&self, key: Key, clock: SharedClock, hold: Duration) -> VirtualPin {
        VirtualPin {
            key,
            input: self.clone(),
            clock,
            hold,
            phase: Phase::Idle,
        }
    }

    fn take_press(&self, key: Key) -> bool {
        let mut state = self.state.lock();
        match state.presses.get_mut(&key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Held(Duration),
    Released(Duration),
}

/// Button pin driven by console input.
pub struct VirtualPin {
    key: Key,
    input: ConsoleInput,
    clock: SharedClock,
    hold: Duration,
    phase: Phase,
}

impl InputPin for VirtualPin {
    fn is_active(&mut self) -> bool {
        let now = self.clock.now();
        match self.phase {
            Phase::Held(since) if now.saturating_sub(since) < self.hold => true,
            Phase::Held(_) => {
                self.phase = Phase::Released(now);
                false
            }
            Phase::Released(since) if now.saturating_sub(since) < self.hold => false,
            Phase::Released(_) | Phase::Idle => {
                let pressed = self.input.take_press(self.key);
                self.phase = if pressed { Phase::Held(now) } else { Phase::Idle };
                pressed
            }
        }
    }
}

/// Badge reader fed by `t <code>` lines.
pub struct ConsoleReader {
    input: ConsoleInput,
}

impl RfidReader for ConsoleReader {
    fn tag_id(&mut self) -> Option<String> {
        self.input.state.lock().badges.pop_front()
    }
}

/// Draws the two display lines in a frame on a writer.
pub struct ConsoleDisplay<W> {
    lines: [String; LINE_COUNT],
    out: W,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            lines: Default::default(),
            out,
        }
    }

    fn draw(&mut self) -> Result<(), DeviceError> {
        let border = format!("+{}+", "-".repeat(LINE_WIDTH));
        writeln!(self.out, "{}", border)?;
        for line in &self.lines {
            writeln!(self.out, "|{:<width$}|", line, width = LINE_WIDTH)?;
        }
        writeln!(self.out, "{}", border)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> TextDisplay for ConsoleDisplay<W> {
    fn clear(&mut self) -> Result<(), DeviceError> {
        self.lines = Default::default();
        Ok(())
    }

    fn show_text(&mut self, text: &str, line: usize) -> Result<(), DeviceError> {
        check_line(line)?;
        self.lines[line] = fit_line(text).to_string();
        self.draw()
    }
}

/// Logs tones and blocks for beeps on the shared clock.
pub struct ConsoleBuzzer {
    clock: SharedClock,
    playing: Option<u32>,
}

impl ConsoleBuzzer {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            playing: None,
        }
    }
}

impl Buzzer for ConsoleBuzzer {
    fn beep(&mut self, hz: u32, duration: Duration) -> Result<(), DeviceError> {
        tracing::debug!(hz, ?duration, "beep");
        self.clock.sleep(duration);
        Ok(())
    }

    fn play(&mut self, hz: u32) -> Result<(), DeviceError> {
        if self.playing != Some(hz) {
            tracing::debug!(hz, "tone on");
        }
        self.playing = Some(hz);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        if let Some(hz) = self.playing.take() {
            tracing::debug!(hz, "tone off");
        }
        Ok(())
    }
}

/// Logs light strip changes.
#[derive(Debug, Default)]
pub struct ConsoleLights {
    lit: Option<Rgb>,
}

impl LightStrip for ConsoleLights {
    fn set_color(&mut self, color: Rgb, pixels: u16) -> Result<(), DeviceError> {
        tracing::debug!(?color, pixels, "lights on");
        self.lit = Some(color);
        Ok(())
    }

    fn off(&mut self) -> Result<(), DeviceError> {
        if self.lit.take().is_some() {
            tracing::debug!("lights off");
        }
        Ok(())
    }
}

/// Builds the console peripheral set and button pins and starts the stdin
/// reader. `q` or end of input stops `stop`.
pub fn console_kiosk(
    clock: SharedClock,
    debounce: Duration,
    stop: StopHandle,
) -> Result<(Peripherals, ButtonPins), DeviceError> {
    let input = ConsoleInput::new(stop);
    input.spawn_reader()?;

    let hold = debounce.max(Duration::from_millis(1));
    let pins = ButtonPins {
        left: Box::new(input.pin(Key::Left, clock.clone(), hold)),
        right: Box::new(input.pin(Key::Right, clock.clone(), hold)),
        select: Box::new(input.pin(Key::Select, clock.clone(), hold)),
        back: Box::new(input.pin(Key::Back, clock.clone(), hold)),
    };

    let io = Peripherals {
        display: Box::new(ConsoleDisplay::new(std::io::stdout())),
        buzzer: Box::new(ConsoleBuzzer::new(clock)),
        lights: Box::new(ConsoleLights::default()),
        rfid: Box::new(ConsoleReader { input }),
    };

    Ok((io, pins))
}
