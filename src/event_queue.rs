//! Interrupt-to-loop notification queue.
//!
//! Button handlers run in interrupt context and must stay short, so anything
//! slow they cause (log lines, display updates) is queued here and carried
//! out by the control loop. Built on `critical-section` and a fixed-size
//! `heapless::Deque`, so it can live in a `static`.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use heapless::Deque;

use crate::button::LogicalButton;
use crate::display::BorderStyle;
use crate::state::OutputState;

/// Notification produced by an accepted button edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A button changed the output state; `state` is the state it produced
    Toggled {
        button: LogicalButton,
        state: OutputState,
    },
    /// A button without state effect was pressed
    Pulse { button: LogicalButton },
    /// The border style changed and the border needs a redraw
    BorderRedraw(BorderStyle),
}

/// Returned when the queue has no free slot; carries the rejected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFullError<T>(pub T);

/// Bounded FIFO shared between interrupt and foreground context.
pub struct EventQueue<T, const SIZE: usize> {
    items: Mutex<RefCell<Deque<T, SIZE>>>,
    dropped: Mutex<Cell<u32>>,
}

impl<T, const SIZE: usize> EventQueue<T, SIZE> {
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(RefCell::new(Deque::new())),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Append `value`.
    ///
    /// A full queue rejects the value and counts it as dropped.
    pub fn push(&self, value: T) -> Result<(), QueueFullError<T>> {
        critical_section::with(|cs| {
            let pushed = self.items.borrow(cs).borrow_mut().push_back(value);
            pushed.map_err(|value| {
                let dropped = self.dropped.borrow(cs);
                dropped.set(dropped.get().wrapping_add(1));
                QueueFullError(value)
            })
        })
    }

    /// Take the oldest value
    pub fn pop(&self) -> Option<T> {
        critical_section::with(|cs| self.items.borrow(cs).borrow_mut().pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.items.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values rejected because the queue was full
    pub fn dropped(&self) -> u32 {
        critical_section::with(|cs| self.dropped.borrow(cs).get())
    }

    /// Iterator that pops until the queue is empty.
    ///
    /// Each step takes its own short critical section, so interrupts are
    /// never held off for the whole drain.
    pub fn drain(&self) -> Drain<'_, T, SIZE> {
        Drain { queue: self }
    }
}

impl<T, const SIZE: usize> Default for EventQueue<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`EventQueue::drain`]
pub struct Drain<'a, T, const SIZE: usize> {
    queue: &'a EventQueue<T, SIZE>,
}

impl<T, const SIZE: usize> Iterator for Drain<'_, T, SIZE> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }
}
