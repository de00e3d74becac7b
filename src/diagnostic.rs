//! Human-readable status lines.
//!
//! One line per control-loop tick and one per accepted button edge. The
//! format is meant for a serial console and is not a stable interface.

use core::fmt::Write;

#[cfg(feature = "esp32-log")]
use esp_println::println;
use heapless::String;

use crate::button::{ButtonLevels, LogicalButton};
use crate::control_loop::AxisSample;
use crate::event_queue::InputEvent;
use crate::outputs::LedDuty;
use crate::state::OutputState;

/// Capacity of a status line
pub const STATUS_LINE_CAPACITY: usize = 128;

/// Line emitted once when the control loop starts
pub const STARTUP_BANNER: &str = "Joystick started";

pub type StatusLine = String<STATUS_LINE_CAPACITY>;

/// Receiver of status lines
pub trait DiagnosticSink {
    fn emit(&mut self, line: &str);
}

/// Sink that discards every line
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _line: &str) {}
}

/// Sink printing to the ESP serial console
#[cfg(feature = "esp32-log")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintlnSink;

#[cfg(feature = "esp32-log")]
impl DiagnosticSink for PrintlnSink {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

const fn level(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "1",
        Some(false) => "0",
        None => "-",
    }
}

/// Status line of one control-loop tick
pub fn tick_line(
    sample: AxisSample,
    levels: ButtonLevels,
    duty: LedDuty,
    state: &OutputState,
) -> StatusLine {
    let mut line = StatusLine::new();
    // A line that does not fit is truncated, not lost
    let _ = write!(
        line,
        "X: {}, Y: {}, A: {}, B: {}, red: {}, blue: {}, PWM: {}, green LED: {}, border: {}",
        sample.x,
        sample.y,
        level(Some(levels.primary)),
        level(levels.secondary),
        duty.red,
        duty.blue,
        on_off(state.pwm_enabled),
        on_off(state.green_led_on),
        state.border_style.index(),
    );
    line
}

/// Status line of an accepted button edge
///
/// Returns `None` for events that are not button presses.
pub fn event_line(event: &InputEvent) -> Option<StatusLine> {
    let mut line = StatusLine::new();
    let _ = match event {
        InputEvent::Toggled {
            button: button @ LogicalButton::Primary,
            state,
        } => write!(
            line,
            "Button {} pressed! PWM {}",
            button.as_str(),
            on_off(state.pwm_enabled)
        ),
        InputEvent::Toggled { button, state } => write!(
            line,
            "Button {} pressed! green LED {}, border {}",
            button.as_str(),
            on_off(state.green_led_on),
            state.border_style.index()
        ),
        InputEvent::Pulse { button } => write!(line, "Button {} pressed!", button.as_str()),
        InputEvent::BorderRedraw(_) => return None,
    };
    Some(line)
}
