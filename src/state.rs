//! Output state machine
//!
//! [`OutputState`] is the only datum shared between the button interrupt
//! handlers (writers) and the control loop (reader). It lives in a
//! [`SharedState`] cell and is only reachable through whole-record snapshots
//! and transition batches, each taken inside one critical section, so the
//! loop can never observe half of a transition.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

use crate::LedDriver;
use crate::display::BorderStyle;
use crate::event_queue::{EventQueue, InputEvent};
use crate::outputs::OutputBank;

/// State toggled by the buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputState {
    /// PWM brightness follows the stick; when false both PWM LEDs are dark
    pub pwm_enabled: bool,
    /// Red/blue LED pair powered
    pub secondary_led_on: bool,
    pub green_led_on: bool,
    pub border_style: BorderStyle,
    /// Number of completed transition batches, wrapping
    pub revision: u32,
}

impl OutputState {
    /// State at power-on
    pub const POWER_ON: Self = Self {
        pwm_enabled: true,
        secondary_led_on: true,
        green_led_on: false,
        border_style: BorderStyle::Single,
        revision: 0,
    };

    /// State after `transition`, without side effects
    #[must_use]
    pub const fn after(self, transition: Transition) -> Self {
        let mut next = self;
        match transition {
            Transition::TogglePwm => next.pwm_enabled = !self.pwm_enabled,
            Transition::ToggleGreenLed => next.green_led_on = !self.green_led_on,
            Transition::AdvanceBorderStyle => next.border_style = self.border_style.next(),
        }
        next
    }
}

impl Default for OutputState {
    fn default() -> Self {
        Self::POWER_ON
    }
}

/// State changes triggered by button presses.
///
/// Every transition toggles or advances, none sets, so applying one twice is
/// not the same as applying it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    TogglePwm,
    ToggleGreenLed,
    AdvanceBorderStyle,
}

/// Critical-section guarded [`OutputState`]
pub struct SharedState {
    inner: Mutex<Cell<OutputState>>,
}

impl SharedState {
    pub const fn new(initial: OutputState) -> Self {
        Self {
            inner: Mutex::new(Cell::new(initial)),
        }
    }

    /// Consistent copy of the whole state
    pub fn read_snapshot(&self) -> OutputState {
        critical_section::with(|cs| self.snapshot_in(cs))
    }

    /// Snapshot inside a critical section the caller already holds
    pub fn snapshot_in(&self, cs: CriticalSection<'_>) -> OutputState {
        self.inner.borrow(cs).get()
    }

    /// Apply a batch of transitions as one update, without side effects.
    ///
    /// Returns the new state.
    pub fn apply_transition(&self, transitions: &[Transition]) -> OutputState {
        critical_section::with(|cs| self.apply_in(cs, transitions))
    }

    pub(crate) fn apply_in(&self, cs: CriticalSection<'_>, transitions: &[Transition]) -> OutputState {
        let cell = self.inner.borrow(cs);
        let mut state = cell.get();
        for transition in transitions {
            state = state.after(*transition);
        }
        state.revision = state.revision.wrapping_add(1);
        cell.set(state);
        state
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(OutputState::POWER_ON)
    }
}

/// Applies transitions together with their hardware side effects.
///
/// Called from interrupt context. Side effects that must be visible at once
/// (PWM zeroing, green LED pin) happen inside the transition's critical
/// section; the border redraw is queued for the control loop.
pub struct OutputStateMachine<'a, O: LedDriver, const EVENT_QUEUE_SIZE: usize> {
    state: &'a SharedState,
    outputs: &'a OutputBank<O>,
    events: &'a EventQueue<InputEvent, EVENT_QUEUE_SIZE>,
}

impl<'a, O: LedDriver, const EVENT_QUEUE_SIZE: usize> OutputStateMachine<'a, O, EVENT_QUEUE_SIZE> {
    pub const fn new(
        state: &'a SharedState,
        outputs: &'a OutputBank<O>,
        events: &'a EventQueue<InputEvent, EVENT_QUEUE_SIZE>,
    ) -> Self {
        Self {
            state,
            outputs,
            events,
        }
    }

    pub const fn state(&self) -> &'a SharedState {
        self.state
    }

    pub const fn outputs(&self) -> &'a OutputBank<O> {
        self.outputs
    }

    pub const fn events(&self) -> &'a EventQueue<InputEvent, EVENT_QUEUE_SIZE> {
        self.events
    }

    /// Apply `transitions` as one atomic batch and return the new state
    pub fn apply(&self, transitions: &[Transition]) -> OutputState {
        critical_section::with(|cs| {
            let previous = self.state.snapshot_in(cs);
            let next = self.state.apply_in(cs, transitions);

            if previous.pwm_enabled && !next.pwm_enabled {
                self.outputs.zero_in(cs);
            }
            if previous.green_led_on != next.green_led_on {
                self.outputs.set_green_in(cs, next.green_led_on);
            }
            if transitions.contains(&Transition::AdvanceBorderStyle) {
                // Losing a redraw only delays the new border to the next full frame
                let _ = self.events.push(InputEvent::BorderRedraw(next.border_style));
            }
            next
        })
    }
}
