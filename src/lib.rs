#![no_std]

pub mod button;
pub mod config;
pub mod control_loop;
pub mod debounce;
pub mod diagnostic;
pub mod display;
pub mod event_queue;
pub mod intensity;
pub mod outputs;
pub mod router;
pub mod state;
pub mod time;

pub use button::{ButtonLevels, ButtonMap, LogicalButton};
pub use config::{AxisConfig, ConfigError, DEBOUNCE_WINDOW, JoystickConfig, PwmLed};
pub use control_loop::{AxisSample, ControlLoop, TickReport};
pub use debounce::DebounceFilter;
pub use diagnostic::{DiagnosticSink, NullSink};
pub use display::{BorderStyle, DisplayConfig, DisplaySurface, NoDisplay, Rect, RectStyle};
pub use event_queue::{EventQueue, InputEvent, QueueFullError};
pub use intensity::{Deadzone, IntensityMapper, MAX_DUTY, map_intensity};
pub use outputs::{LedDuty, OutputBank};
pub use router::InputRouter;
pub use state::{OutputState, OutputStateMachine, SharedState, Transition};
pub use time::{TimeSource, Timestamp};
pub use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
pub use diagnostic::PrintlnSink;

/// Abstract ADC trait
///
/// Implement this trait to read the joystick potentiometers on your board.
pub trait AnalogSampler {
    /// Read `channel`, returning a value in `0..=4095`
    fn read(&mut self, channel: u8) -> u16;
}

/// Digital input trait
///
/// Reads the raw level of a button line for the status log. Lines are pulled
/// up, so a released button reads high.
pub trait DigitalInput {
    fn get(&mut self, pin: u8) -> bool;
}

/// Output side of the board: two PWM channels and the green LED pin.
///
/// Called from both interrupt and loop context, always through
/// [`OutputBank`], never directly.
pub trait LedDriver {
    /// Set the PWM duty of `led`, `0..=4095`
    fn set_duty(&mut self, led: PwmLed, duty: u16);

    /// Switch the green LED
    fn set_green(&mut self, on: bool);
}
