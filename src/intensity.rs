//! Joystick sample to PWM duty mapping.
//!
//! Brightness grows linearly with the distance of the stick from its rest
//! position, in both directions. A per-axis dead zone suppresses the drift
//! of a stick that is not being touched.

/// Largest raw ADC value and largest PWM duty (12-bit).
pub const MAX_DUTY: u16 = 4095;

/// Raw value of a centered stick.
pub const DEFAULT_CENTER: u16 = 2048;

/// Duty units per raw unit of distance from the center.
pub const DEFAULT_GAIN: u16 = 2;

/// Inclusive band of raw values mapped to zero brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadzone {
    pub low: u16,
    pub high: u16,
}

impl Deadzone {
    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }

    /// Returns true if `raw` falls inside the band, bounds included
    pub const fn contains(self, raw: u16) -> bool {
        raw >= self.low && raw <= self.high
    }

    pub(crate) const fn is_ordered(self) -> bool {
        self.low <= self.high
    }
}

/// Axis-specific mapper from raw samples to duty values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityMapper {
    deadzone: Deadzone,
    center: u16,
    gain: u16,
}

impl IntensityMapper {
    pub const fn new(deadzone: Deadzone, center: u16, gain: u16) -> Self {
        Self {
            deadzone,
            center,
            gain,
        }
    }

    /// Mapper with the default center and gain
    pub const fn with_deadzone(deadzone: Deadzone) -> Self {
        Self::new(deadzone, DEFAULT_CENTER, DEFAULT_GAIN)
    }

    pub const fn deadzone(&self) -> Deadzone {
        self.deadzone
    }

    /// Map a raw sample to a duty in `0..=MAX_DUTY`
    pub const fn map(&self, raw: u16) -> u16 {
        map_intensity(raw, self.deadzone, self.center, self.gain)
    }
}

/// Map `raw` to a duty value.
///
/// Computes `|raw - center| * gain`, saturated to [`MAX_DUTY`]. Samples inside
/// `deadzone` map to zero regardless of their distance.
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
pub const fn map_intensity(raw: u16, deadzone: Deadzone, center: u16, gain: u16) -> u16 {
    if deadzone.contains(raw) {
        return 0;
    }
    let scaled = raw.abs_diff(center) as u32 * gain as u32;
    if scaled > MAX_DUTY as u32 {
        MAX_DUTY
    } else {
        scaled as u16
    }
}
