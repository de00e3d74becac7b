//! LED outputs shared by the interrupt handlers and the control loop.

use core::cell::{Cell, RefCell};

use critical_section::{CriticalSection, Mutex};

use crate::LedDriver;
use crate::config::PwmLed;

/// Duty values last written to the PWM LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedDuty {
    pub red: u16,
    pub blue: u16,
}

impl LedDuty {
    pub const OFF: Self = Self { red: 0, blue: 0 };

    pub const fn new(red: u16, blue: u16) -> Self {
        Self { red, blue }
    }

    pub const fn is_off(self) -> bool {
        self.red == 0 && self.blue == 0
    }
}

/// LED driver guarded by a critical section.
///
/// Both execution contexts write LEDs: the loop sets brightness every tick,
/// button handlers switch the green LED and force the PWM pair dark. All
/// writes go through the `*_in` methods, which require a
/// [`CriticalSection`] token, so a caller can combine a state check and an
/// output write into one uninterruptible step.
pub struct OutputBank<O: LedDriver> {
    driver: Mutex<RefCell<O>>,
    duty: Mutex<Cell<LedDuty>>,
}

impl<O: LedDriver> OutputBank<O> {
    pub const fn new(driver: O) -> Self {
        Self {
            driver: Mutex::new(RefCell::new(driver)),
            duty: Mutex::new(Cell::new(LedDuty::OFF)),
        }
    }

    /// Write both PWM duties
    pub fn set_duty_in(&self, cs: CriticalSection<'_>, duty: LedDuty) {
        let mut driver = self.driver.borrow(cs).borrow_mut();
        driver.set_duty(PwmLed::Red, duty.red);
        driver.set_duty(PwmLed::Blue, duty.blue);
        self.duty.borrow(cs).set(duty);
    }

    /// Force both PWM LEDs dark
    pub fn zero_in(&self, cs: CriticalSection<'_>) {
        self.set_duty_in(cs, LedDuty::OFF);
    }

    /// Drive the green LED pin
    pub fn set_green_in(&self, cs: CriticalSection<'_>, on: bool) {
        self.driver.borrow(cs).borrow_mut().set_green(on);
    }

    /// Duty values last written
    pub fn duty(&self) -> LedDuty {
        critical_section::with(|cs| self.duty.borrow(cs).get())
    }

    /// Run `f` with exclusive access to the driver
    pub fn with_driver<R>(&self, f: impl FnOnce(&mut O) -> R) -> R {
        critical_section::with(|cs| f(&mut self.driver.borrow(cs).borrow_mut()))
    }
}
