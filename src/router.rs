//! Input event router
//!
//! Entry point of the button interrupt handlers. A falling edge is resolved
//! to its logical button, filtered by the debouncer and turned into state
//! transitions. A notification for the log is queued for every accepted edge.

use crate::LedDriver;
use crate::button::{ButtonMap, LogicalButton};
use crate::config::JoystickConfig;
use crate::debounce::DebounceFilter;
use crate::event_queue::InputEvent;
use crate::state::{OutputStateMachine, Transition};
use crate::time::{TimeSource, Timestamp};

const PRIMARY_TRANSITIONS: &[Transition] = &[Transition::TogglePwm];
const JOYSTICK_TRANSITIONS: &[Transition] = &[Transition::ToggleGreenLed];
const JOYSTICK_DISPLAY_TRANSITIONS: &[Transition] =
    &[Transition::ToggleGreenLed, Transition::AdvanceBorderStyle];

/// Dispatches debounced button edges to the output state machine.
pub struct InputRouter<'a, O: LedDriver, const EVENT_QUEUE_SIZE: usize> {
    buttons: ButtonMap,
    debounce: &'a DebounceFilter,
    machine: OutputStateMachine<'a, O, EVENT_QUEUE_SIZE>,
    has_display: bool,
}

impl<'a, O: LedDriver, const EVENT_QUEUE_SIZE: usize> InputRouter<'a, O, EVENT_QUEUE_SIZE> {
    /// Router for the buttons of `config`.
    ///
    /// The joystick button advances the border only if `config` has a
    /// display.
    pub const fn new(
        config: &JoystickConfig,
        debounce: &'a DebounceFilter,
        machine: OutputStateMachine<'a, O, EVENT_QUEUE_SIZE>,
    ) -> Self {
        Self {
            buttons: config.buttons,
            debounce,
            machine,
            has_display: config.has_display(),
        }
    }

    /// Handle a falling edge on `pin`.
    ///
    /// Pins that carry no configured button are ignored.
    pub fn on_edge(&self, pin: u8, now: Timestamp) -> Option<InputEvent> {
        let button = self.buttons.resolve(pin)?;
        self.on_button(button, now)
    }

    /// Handle a falling edge on `pin`, stamped by `clock`
    pub fn on_edge_now<T: TimeSource>(&self, pin: u8, clock: &T) -> Option<InputEvent> {
        self.on_edge(pin, clock.now())
    }

    /// Handle a falling edge of `button`.
    ///
    /// Returns the queued notification, or `None` if the edge was a bounce.
    pub fn on_button(&self, button: LogicalButton, now: Timestamp) -> Option<InputEvent> {
        if self.buttons.pin(button).is_none() || !self.debounce.accept(button, now) {
            return None;
        }

        let event = match self.transitions(button) {
            Some(transitions) => InputEvent::Toggled {
                button,
                state: self.machine.apply(transitions),
            },
            None => InputEvent::Pulse { button },
        };
        // The transition already happened; a full queue only loses the log line
        let _ = self.machine.events().push(event);
        Some(event)
    }

    fn transitions(&self, button: LogicalButton) -> Option<&'static [Transition]> {
        match button {
            LogicalButton::Primary => Some(PRIMARY_TRANSITIONS),
            LogicalButton::Joystick if self.has_display => Some(JOYSTICK_DISPLAY_TRANSITIONS),
            LogicalButton::Joystick => Some(JOYSTICK_TRANSITIONS),
            LogicalButton::Secondary => None,
        }
    }
}
