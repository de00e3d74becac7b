#![allow(dead_code)]

use joystick_dimmer::{
    AnalogSampler, DiagnosticSink, DigitalInput, DisplaySurface, LedDriver, PwmLed, Rect,
    RectStyle,
};

/// LED driver recording every write
#[derive(Debug, Default)]
pub(crate) struct MockLeds {
    pub(crate) red: u16,
    pub(crate) blue: u16,
    pub(crate) green: bool,
    pub(crate) writes: Vec<(PwmLed, u16)>,
}

impl LedDriver for MockLeds {
    fn set_duty(&mut self, led: PwmLed, duty: u16) {
        match led {
            PwmLed::Red => self.red = duty,
            PwmLed::Blue => self.blue = duty,
        }
        self.writes.push((led, duty));
    }

    fn set_green(&mut self, on: bool) {
        self.green = on;
    }
}

/// ADC returning fixed values per channel
#[derive(Debug, Clone, Copy)]
pub(crate) struct MockSampler {
    pub(crate) channels: [u16; 2],
}

impl MockSampler {
    /// Sampler wired like the default board: X on channel 1, Y on channel 0
    pub(crate) const fn new(x: u16, y: u16) -> Self {
        Self { channels: [y, x] }
    }

    pub(crate) fn set(&mut self, x: u16, y: u16) {
        self.channels = [y, x];
    }
}

impl AnalogSampler for MockSampler {
    fn read(&mut self, channel: u8) -> u16 {
        self.channels[channel as usize]
    }
}

/// Button lines pulled up; pins listed in `held` read low
#[derive(Debug, Default)]
pub(crate) struct MockInputs {
    pub(crate) held: Vec<u8>,
}

impl DigitalInput for MockInputs {
    fn get(&mut self, pin: u8) -> bool {
        !self.held.contains(&pin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawOp {
    Clear,
    Rect(Rect, RectStyle),
    Pixel(u8, u8),
    Present,
}

/// Display surface recording draw calls
#[derive(Debug, Default)]
pub(crate) struct MockDisplay {
    pub(crate) ops: Vec<DrawOp>,
}

impl DisplaySurface for MockDisplay {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_rect(&mut self, rect: Rect, style: RectStyle) {
        self.ops.push(DrawOp::Rect(rect, style));
    }

    fn draw_pixel(&mut self, x: u8, y: u8) {
        self.ops.push(DrawOp::Pixel(x, y));
    }

    fn present(&mut self) {
        self.ops.push(DrawOp::Present);
    }
}

/// Sink collecting lines
#[derive(Debug, Default)]
pub(crate) struct VecSink {
    pub(crate) lines: Vec<String>,
}

impl DiagnosticSink for VecSink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
