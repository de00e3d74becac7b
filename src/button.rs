//! Logical buttons and their pin assignment.

use crate::DigitalInput;

const BUTTON_NAME_PRIMARY: &str = "A";
const BUTTON_NAME_JOYSTICK: &str = "SW";
const BUTTON_NAME_SECONDARY: &str = "B";

const BUTTON_ID_PRIMARY: u8 = 0;
const BUTTON_ID_JOYSTICK: u8 = 1;
const BUTTON_ID_SECONDARY: u8 = 2;

/// Debounced, semantic identity of a physical input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LogicalButton {
    /// Toggles PWM output on and off
    Primary = BUTTON_ID_PRIMARY,
    /// Joystick push: toggles the green LED and cycles the border style
    Joystick = BUTTON_ID_JOYSTICK,
    /// Optional extra button, only reported in the diagnostic log
    Secondary = BUTTON_ID_SECONDARY,
}

impl LogicalButton {
    /// Number of logical buttons.
    pub const COUNT: usize = 3;

    pub const ALL: [Self; Self::COUNT] = [Self::Primary, Self::Joystick, Self::Secondary];

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            BUTTON_ID_PRIMARY => Self::Primary,
            BUTTON_ID_JOYSTICK => Self::Joystick,
            BUTTON_ID_SECONDARY => Self::Secondary,
            _ => return None,
        })
    }

    /// Index into per-button tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Silkscreen label of the button
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => BUTTON_NAME_PRIMARY,
            Self::Joystick => BUTTON_NAME_JOYSTICK,
            Self::Secondary => BUTTON_NAME_SECONDARY,
        }
    }
}

/// Pin assignment of the logical buttons.
///
/// Built once from configuration; interrupt dispatch resolves a pin through
/// it instead of per-pin callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMap {
    pub primary: u8,
    pub joystick: u8,
    pub secondary: Option<u8>,
}

impl ButtonMap {
    /// Resolve the button wired to `pin`
    pub const fn resolve(&self, pin: u8) -> Option<LogicalButton> {
        if pin == self.primary {
            return Some(LogicalButton::Primary);
        }
        if pin == self.joystick {
            return Some(LogicalButton::Joystick);
        }
        match self.secondary {
            Some(secondary) if secondary == pin => Some(LogicalButton::Secondary),
            _ => None,
        }
    }

    /// Pin of `button`, if it is wired
    pub const fn pin(&self, button: LogicalButton) -> Option<u8> {
        match button {
            LogicalButton::Primary => Some(self.primary),
            LogicalButton::Joystick => Some(self.joystick),
            LogicalButton::Secondary => self.secondary,
        }
    }

    /// Returns true if two buttons share a pin
    pub const fn has_duplicates(&self) -> bool {
        if self.primary == self.joystick {
            return true;
        }
        match self.secondary {
            Some(pin) => pin == self.primary || pin == self.joystick,
            None => false,
        }
    }

    /// Sample the raw levels of the buttons shown in the status line
    pub fn levels<I: DigitalInput>(&self, inputs: &mut I) -> ButtonLevels {
        ButtonLevels {
            primary: inputs.get(self.primary),
            secondary: self.secondary.map(|pin| inputs.get(pin)),
        }
    }
}

/// Raw line levels of the A and B buttons, high when released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonLevels {
    pub primary: bool,
    /// `None` when the B button is not wired
    pub secondary: Option<bool>,
}
