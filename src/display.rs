//! Display composition
//!
//! Decides what the optional monochrome display shows: a border in one of
//! three styles and a square indicator that follows the stick. Pixel drawing
//! itself is left to a [`DisplaySurface`] implementation.

use crate::intensity::MAX_DUTY;

/// Width of the band the border styles draw into
const BORDER_BAND: u8 = 3;

/// Spacing of the dots of [`BorderStyle::Dotted`]
const DOT_SPACING: usize = 3;

/// How a rectangle is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectStyle {
    /// One-pixel outline in the foreground color
    Outline,
    /// Filled with the foreground color
    Filled,
    /// One-pixel outline in the background color
    Erase,
    /// Filled with the background color
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
}

impl Rect {
    pub const fn new(x: u8, y: u8, width: u8, height: u8) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrink by `amount` pixels on every side
    pub const fn inset(self, amount: u8) -> Self {
        Self {
            x: self.x.saturating_add(amount),
            y: self.y.saturating_add(amount),
            width: self.width.saturating_sub(amount.saturating_mul(2)),
            height: self.height.saturating_sub(amount.saturating_mul(2)),
        }
    }
}

/// Drawing capability of the display.
///
/// Calls between [`clear`](Self::clear) and [`present`](Self::present) go
/// to a back buffer; `present` pushes it to the panel.
pub trait DisplaySurface {
    /// False for surfaces that stand in for a missing panel
    const ATTACHED: bool = true;

    fn clear(&mut self);
    fn draw_rect(&mut self, rect: Rect, style: RectStyle);
    fn draw_pixel(&mut self, x: u8, y: u8);
    fn present(&mut self);
}

/// Placeholder surface for boards without a display.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl DisplaySurface for NoDisplay {
    const ATTACHED: bool = false;

    fn clear(&mut self) {}
    fn draw_rect(&mut self, _rect: Rect, _style: RectStyle) {}
    fn draw_pixel(&mut self, _x: u8, _y: u8) {}
    fn present(&mut self) {}
}

/// Geometry of the attached display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u8,
    pub height: u8,
    /// Side length of the square indicator
    pub indicator_size: u8,
}

impl DisplayConfig {
    /// 128x64 SSD1306 panel with an 8 pixel indicator.
    pub const SSD1306: Self = Self {
        width: 128,
        height: 64,
        indicator_size: 8,
    };

    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub(crate) const fn fits_indicator(&self) -> bool {
        self.indicator_size > 0
            && self.indicator_size < self.width
            && self.indicator_size < self.height
    }

    /// Top-left corner of the indicator for a raw stick position.
    ///
    /// X grows to the right, Y is inverted so pushing the stick up moves the
    /// indicator to the top of the screen.
    #[allow(clippy::cast_possible_truncation)]
    pub fn indicator_position(&self, x_raw: u16, y_raw: u16) -> (u8, u8) {
        let x_raw = u32::from(x_raw.min(MAX_DUTY));
        let y_raw = u32::from(MAX_DUTY - y_raw.min(MAX_DUTY));
        let x_span = u32::from(self.width.saturating_sub(self.indicator_size));
        let y_span = u32::from(self.height.saturating_sub(self.indicator_size));
        let max = u32::from(MAX_DUTY);
        ((x_raw * x_span / max) as u8, (y_raw * y_span / max) as u8)
    }

    /// Indicator rectangle for a raw stick position
    pub fn indicator(&self, x_raw: u16, y_raw: u16) -> Rect {
        let (x, y) = self.indicator_position(x_raw, y_raw);
        Rect::new(x, y, self.indicator_size, self.indicator_size)
    }
}

const BORDER_ID_SINGLE: u8 = 0;
const BORDER_ID_DOUBLE: u8 = 1;
const BORDER_ID_DOTTED: u8 = 2;

/// Border drawn around the display, cycled by the joystick button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BorderStyle {
    #[default]
    Single = BORDER_ID_SINGLE,
    Double = BORDER_ID_DOUBLE,
    Dotted = BORDER_ID_DOTTED,
}

impl BorderStyle {
    pub const fn from_index(value: u8) -> Option<Self> {
        Some(match value {
            BORDER_ID_SINGLE => Self::Single,
            BORDER_ID_DOUBLE => Self::Double,
            BORDER_ID_DOTTED => Self::Dotted,
            _ => return None,
        })
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Following style, wrapping after the last one
    pub const fn next(self) -> Self {
        match self {
            Self::Single => Self::Double,
            Self::Double => Self::Dotted,
            Self::Dotted => Self::Single,
        }
    }
}

/// Draw `style` around the edge of the display
pub fn draw_border<D: DisplaySurface>(surface: &mut D, style: BorderStyle, config: &DisplayConfig) {
    let bounds = config.bounds();
    match style {
        BorderStyle::Single => surface.draw_rect(bounds, RectStyle::Outline),
        BorderStyle::Double => {
            surface.draw_rect(bounds, RectStyle::Outline);
            surface.draw_rect(bounds.inset(2), RectStyle::Outline);
        }
        BorderStyle::Dotted => {
            let right = config.width.saturating_sub(1);
            let bottom = config.height.saturating_sub(1);
            for x in (0..config.width).step_by(DOT_SPACING) {
                surface.draw_pixel(x, 0);
                surface.draw_pixel(x, bottom);
            }
            for y in (0..config.height).step_by(DOT_SPACING) {
                surface.draw_pixel(0, y);
                surface.draw_pixel(right, y);
            }
        }
    }
}

/// Replace the border without touching the rest of the screen
pub fn redraw_border<D: DisplaySurface>(surface: &mut D, style: BorderStyle, config: &DisplayConfig) {
    let bounds = config.bounds();
    for inset in 0..BORDER_BAND {
        surface.draw_rect(bounds.inset(inset), RectStyle::Erase);
    }
    draw_border(surface, style, config);
    surface.present();
}

/// Draw a complete frame: border plus the indicator at the stick position
pub fn draw_frame<D: DisplaySurface>(
    surface: &mut D,
    style: BorderStyle,
    x_raw: u16,
    y_raw: u16,
    config: &DisplayConfig,
) {
    surface.clear();
    draw_border(surface, style, config);
    surface.draw_rect(config.indicator(x_raw, y_raw), RectStyle::Filled);
    surface.present();
}

/// Move the indicator without clearing the screen.
///
/// Used right after a border-only redraw so that redraw stays on the panel.
/// The border is drawn again in case the old indicator covered part of it.
pub fn move_indicator<D: DisplaySurface>(
    surface: &mut D,
    style: BorderStyle,
    from: Rect,
    to: Rect,
    config: &DisplayConfig,
) {
    surface.draw_rect(from, RectStyle::Clear);
    draw_border(surface, style, config);
    surface.draw_rect(to, RectStyle::Filled);
    surface.present();
}
