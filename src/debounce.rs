//! Time-window debounce for edge interrupts.
//!
//! Mechanical switches bounce for a few milliseconds after each press and
//! fire a burst of falling edges. An edge is accepted only if the previous
//! accepted edge of the same button lies more than the window in the past.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::Duration;

use crate::button::LogicalButton;
use crate::config::JoystickConfig;
use crate::time::Timestamp;

/// Per-button record of the last accepted edge.
///
/// All records start at [`Timestamp::EPOCH`], so an edge that arrives within
/// the first window after startup is discarded.
pub struct DebounceFilter {
    window: Duration,
    records: Mutex<Cell<[Timestamp; LogicalButton::COUNT]>>,
}

impl DebounceFilter {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            records: Mutex::new(Cell::new([Timestamp::EPOCH; LogicalButton::COUNT])),
        }
    }

    /// Filter using the configured debounce window
    pub const fn from_config(config: &JoystickConfig) -> Self {
        Self::new(config.debounce_window)
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Decide whether the edge at `now` is a genuine press.
    ///
    /// On acceptance the record is updated before the critical section is
    /// released, so two edges of one button can never both pass.
    pub fn accept(&self, button: LogicalButton, now: Timestamp) -> bool {
        critical_section::with(|cs| {
            let cell = self.records.borrow(cs);
            let mut records = cell.get();
            let last = records[button.index()];
            if !now.is_beyond(last, self.window) {
                return false;
            }
            records[button.index()] = now;
            cell.set(records);
            true
        })
    }

    /// Timestamp of the last accepted edge of `button`
    pub fn last_accepted(&self, button: LogicalButton) -> Timestamp {
        critical_section::with(|cs| self.records.borrow(cs).get()[button.index()])
    }
}
