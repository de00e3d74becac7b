//! Startup configuration.
//!
//! Every threshold and pin number lives in one immutable [`JoystickConfig`]
//! that is validated once and then handed to each component.

use embassy_time::Duration;

use crate::button::ButtonMap;
use crate::display::DisplayConfig;
use crate::intensity::{DEFAULT_CENTER, DEFAULT_GAIN, Deadzone, IntensityMapper};
use crate::outputs::LedDuty;
use crate::state::OutputState;

/// Minimum time between two accepted edges of the same button.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Loop period without a display.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(100);

/// Loop period with a display attached.
pub const DISPLAY_TICK_PERIOD: Duration = Duration::from_millis(50);

/// PWM-driven LED channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmLed {
    Red,
    Blue,
}

/// One joystick axis: where it is sampled, which LED it dims and its rest band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConfig {
    /// ADC input channel
    pub channel: u8,
    /// LED whose brightness follows this axis
    pub led: PwmLed,
    /// Rest-position band mapped to zero brightness
    pub deadzone: Deadzone,
}

/// Duty both PWM LEDs show between power-on and the first tick.
pub const POWER_ON_DUTY: LedDuty = LedDuty::new(100, 100);

/// Errors reported by [`JoystickConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Dead zone lower bound above its upper bound
    InvertedDeadzone(PwmLed),
    /// Gain of zero would keep both LEDs dark
    ZeroGain,
    /// Two buttons share a pin
    DuplicateButtonPin,
    /// Both axes drive the same LED
    SharedLed,
    /// Indicator does not fit on the display
    IndicatorTooLarge,
    /// A display surface was given without display geometry, or the reverse
    DisplayMismatch,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvertedDeadzone(led) => write!(f, "dead zone of the axis driving {:?} is inverted", led),
            Self::ZeroGain => f.write_str("gain must not be zero"),
            Self::DuplicateButtonPin => f.write_str("two buttons share a pin"),
            Self::SharedLed => f.write_str("both axes drive the same LED"),
            Self::IndicatorTooLarge => f.write_str("indicator does not fit the display"),
            Self::DisplayMismatch => f.write_str("display surface and display geometry disagree"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Configuration of the whole core
#[derive(Debug, Clone, Copy)]
pub struct JoystickConfig {
    pub buttons: ButtonMap,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    /// Raw value of the joystick rest position
    pub center: u16,
    /// Linear gain from distance-to-center to duty
    pub gain: u16,
    pub debounce_window: Duration,
    pub tick_period: Duration,
    /// Display attached to the board, if any
    pub display: Option<DisplayConfig>,
    /// State at power-on
    pub initial_state: OutputState,
    /// PWM duties written at startup
    pub initial_duty: LedDuty,
}

impl JoystickConfig {
    /// Board without display: buttons A, SW and B, red and blue LEDs on PWM.
    pub const DEFAULT: Self = Self {
        buttons: ButtonMap {
            primary: 5,
            joystick: 22,
            secondary: Some(6),
        },
        x_axis: AxisConfig {
            channel: 1,
            led: PwmLed::Red,
            deadzone: Deadzone::new(2048, 2128),
        },
        y_axis: AxisConfig {
            channel: 0,
            led: PwmLed::Blue,
            deadzone: Deadzone::new(2040, 2090),
        },
        center: DEFAULT_CENTER,
        gain: DEFAULT_GAIN,
        debounce_window: DEBOUNCE_WINDOW,
        tick_period: DEFAULT_TICK_PERIOD,
        display: None,
        initial_state: OutputState::POWER_ON,
        initial_duty: POWER_ON_DUTY,
    };

    /// Same board with the 128x64 display attached.
    pub const WITH_DISPLAY: Self = Self {
        buttons: ButtonMap {
            primary: 5,
            joystick: 22,
            secondary: None,
        },
        tick_period: DISPLAY_TICK_PERIOD,
        display: Some(DisplayConfig::SSD1306),
        ..Self::DEFAULT
    };

    /// Check the configuration for values the core cannot work with
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if !self.x_axis.deadzone.is_ordered() {
            return Err(ConfigError::InvertedDeadzone(self.x_axis.led));
        }
        if !self.y_axis.deadzone.is_ordered() {
            return Err(ConfigError::InvertedDeadzone(self.y_axis.led));
        }
        if self.gain == 0 {
            return Err(ConfigError::ZeroGain);
        }
        if self.buttons.has_duplicates() {
            return Err(ConfigError::DuplicateButtonPin);
        }
        if matches!(
            (self.x_axis.led, self.y_axis.led),
            (PwmLed::Red, PwmLed::Red) | (PwmLed::Blue, PwmLed::Blue)
        ) {
            return Err(ConfigError::SharedLed);
        }
        if let Some(display) = self.display {
            if !display.fits_indicator() {
                return Err(ConfigError::IndicatorTooLarge);
            }
        }
        Ok(())
    }

    /// Returns true if a display is attached
    pub const fn has_display(&self) -> bool {
        self.display.is_some()
    }

    /// Intensity mapper of the X axis
    pub const fn x_mapper(&self) -> IntensityMapper {
        IntensityMapper::new(self.x_axis.deadzone, self.center, self.gain)
    }

    /// Intensity mapper of the Y axis
    pub const fn y_mapper(&self) -> IntensityMapper {
        IntensityMapper::new(self.y_axis.deadzone, self.center, self.gain)
    }
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
