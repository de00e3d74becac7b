//! Foreground control loop.
//!
//! Samples the stick, applies PWM brightness, refreshes the display and logs
//! a status line once per tick. Pacing is portable: [`ControlLoop::tick`]
//! returns how long to wait, and the caller does the sleeping.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::button::ButtonMap;
use crate::config::{AxisConfig, ConfigError, JoystickConfig, PwmLed};
use crate::diagnostic::{self, DiagnosticSink};
use crate::display::{self, DisplayConfig, DisplaySurface, NoDisplay, Rect};
use crate::event_queue::InputEvent;
use crate::intensity::IntensityMapper;
use crate::outputs::LedDuty;
use crate::state::{OutputState, OutputStateMachine};
use crate::{AnalogSampler, DigitalInput, LedDriver};

/// Raw readings of both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSample {
    pub x: u16,
    pub y: u16,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    pub sample: AxisSample,
    /// Duties written this tick, `None` while PWM is disabled
    pub applied: Option<LedDuty>,
    /// State the tick worked with
    pub state: OutputState,
    /// Deadline of the next tick
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero when behind schedule)
    pub sleep_duration: Duration,
}

/// Mapper and LED of one axis
#[derive(Debug, Clone, Copy)]
struct AxisChannel {
    channel: u8,
    led: PwmLed,
    mapper: IntensityMapper,
}

impl AxisChannel {
    const fn new(axis: &AxisConfig, mapper: IntensityMapper) -> Self {
        Self {
            channel: axis.channel,
            led: axis.led,
            mapper,
        }
    }
}

/// The always-running driver of the foreground context.
pub struct ControlLoop<
    'a,
    S: AnalogSampler,
    I: DigitalInput,
    O: LedDriver,
    L: DiagnosticSink,
    const EVENT_QUEUE_SIZE: usize,
    D: DisplaySurface = NoDisplay,
> {
    sampler: S,
    inputs: I,
    sink: L,
    surface: D,
    /// Geometry of the attached display, `None` without one
    display: Option<DisplayConfig>,
    shared: OutputStateMachine<'a, O, EVENT_QUEUE_SIZE>,
    buttons: ButtonMap,
    x_axis: AxisChannel,
    y_axis: AxisChannel,
    initial_duty: LedDuty,
    /// Indicator drawn by the last frame
    indicator: Option<Rect>,
    next_tick: Instant,
    period: Duration,
}

impl<'a, S, I, O, L, const EVENT_QUEUE_SIZE: usize, D> ControlLoop<'a, S, I, O, L, EVENT_QUEUE_SIZE, D>
where
    S: AnalogSampler,
    I: DigitalInput,
    O: LedDriver,
    L: DiagnosticSink,
    D: DisplaySurface,
{
    /// Create the loop for `config`.
    ///
    /// `shared` gives access to the state and LEDs the button handlers use.
    /// Pass [`NoDisplay`] as `surface` exactly when `config` has no display.
    pub fn new(
        config: &JoystickConfig,
        shared: OutputStateMachine<'a, O, EVENT_QUEUE_SIZE>,
        sampler: S,
        inputs: I,
        sink: L,
        surface: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.has_display() != D::ATTACHED {
            return Err(ConfigError::DisplayMismatch);
        }

        #[cfg(feature = "esp32-log")]
        println!(
            "[ControlLoop.new] period {:?} ms, deadzones x {:?} y {:?}, display {}",
            config.tick_period.as_millis(),
            config.x_axis.deadzone,
            config.y_axis.deadzone,
            config.has_display()
        );
        Ok(Self {
            sampler,
            inputs,
            sink,
            surface,
            display: config.display,
            shared,
            buttons: config.buttons,
            x_axis: AxisChannel::new(&config.x_axis, config.x_mapper()),
            y_axis: AxisChannel::new(&config.y_axis, config.y_mapper()),
            initial_duty: config.initial_duty,
            indicator: None,
            next_tick: Instant::from_millis(0),
            period: config.tick_period,
        })
    }

    /// Bring the outputs to their power-on values and announce the start.
    ///
    /// Both PWM LEDs show the configured initial duty until the first tick,
    /// unless PWM starts disabled.
    pub fn start(&mut self) {
        let outputs = self.shared.outputs();
        let state = critical_section::with(|cs| {
            let state = self.shared.state().snapshot_in(cs);
            let duty = if state.pwm_enabled {
                self.initial_duty
            } else {
                LedDuty::OFF
            };
            outputs.set_duty_in(cs, duty);
            outputs.set_green_in(cs, state.green_led_on);
            state
        });

        if let Some(config) = self.display {
            self.surface.clear();
            display::draw_border(&mut self.surface, state.border_style, &config);
            self.surface.present();
        }
        self.sink.emit(diagnostic::STARTUP_BANNER);
    }

    /// Run one iteration and return timing information.
    ///
    /// 1. Logs queued button events and redraws a changed border
    /// 2. Samples both axes
    /// 3. Applies PWM duties if enabled
    /// 4. Redraws the indicator
    /// 5. Logs the status line
    /// 6. Schedules the next tick
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let border_redrawn = self.drain_events();

        let sample = self.sample();
        let duty = self.duty_for(sample);

        // Check and write under one lock: a disable that lands between them
        // would otherwise be overwritten with stale brightness.
        let outputs = self.shared.outputs();
        let (state, applied) = critical_section::with(|cs| {
            let state = self.shared.state().snapshot_in(cs);
            if !state.pwm_enabled {
                return (state, None);
            }
            outputs.set_duty_in(cs, duty);
            (state, Some(duty))
        });

        if let Some(config) = self.display {
            let indicator = config.indicator(sample.x, sample.y);
            match self.indicator {
                // Keep the border-only redraw on screen
                Some(previous) if border_redrawn => display::move_indicator(
                    &mut self.surface,
                    state.border_style,
                    previous,
                    indicator,
                    &config,
                ),
                _ => display::draw_frame(
                    &mut self.surface,
                    state.border_style,
                    sample.x,
                    sample.y,
                    &config,
                ),
            }
            self.indicator = Some(indicator);
        }

        let levels = self.buttons.levels(&mut self.inputs);
        let line = diagnostic::tick_line(sample, levels, applied.unwrap_or(LedDuty::OFF), &state);
        self.sink.emit(&line);

        let (next_deadline, sleep_duration) = self.schedule(now);
        TickReport {
            sample,
            applied,
            state,
            next_deadline,
            sleep_duration,
        }
    }

    /// Start, then run forever, sleeping between ticks
    pub fn run(&mut self, mut clock: impl FnMut() -> Instant, mut sleep: impl FnMut(Duration)) -> ! {
        self.start();
        loop {
            let report = self.tick(clock());
            sleep(report.sleep_duration);
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Get a reference to the display surface, if a display is attached
    pub fn display(&self) -> Option<&D> {
        self.display.map(|_| &self.surface)
    }

    /// Get a mutable reference to the sampler.
    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Log queued events and perform queued border redraws.
    ///
    /// Returns true if the border was redrawn.
    fn drain_events(&mut self) -> bool {
        let mut border_redrawn = false;
        for event in self.shared.events().drain() {
            if let InputEvent::BorderRedraw(style) = event {
                if let Some(config) = self.display {
                    display::redraw_border(&mut self.surface, style, &config);
                    border_redrawn = true;
                }
                continue;
            }
            if let Some(line) = diagnostic::event_line(&event) {
                self.sink.emit(&line);
            }
        }
        border_redrawn
    }

    fn sample(&mut self) -> AxisSample {
        AxisSample {
            x: self.sampler.read(self.x_axis.channel),
            y: self.sampler.read(self.y_axis.channel),
        }
    }

    fn duty_for(&self, sample: AxisSample) -> LedDuty {
        let mut duty = LedDuty::OFF;
        for (axis, raw) in [(self.x_axis, sample.x), (self.y_axis, sample.y)] {
            let value = axis.mapper.map(raw);
            match axis.led {
                PwmLed::Red => duty.red = value,
                PwmLed::Blue => duty.blue = value,
            }
        }
        duty
    }

    /// Advance the deadline by one period.
    ///
    /// Falling more than two periods behind restarts the schedule at `now`
    /// instead of bursting through the backlog.
    fn schedule(&mut self, now: Instant) -> (Instant, Duration) {
        let max_drift = self.period * 2;
        if now > self.next_tick + max_drift {
            #[cfg(feature = "esp32-log")]
            println!(
                "[ControlLoop.schedule] {:?} ms behind, resetting",
                (now - self.next_tick).as_millis()
            );
            self.next_tick = now;
        }

        self.next_tick += self.period;

        let sleep = if self.next_tick > now {
            self.next_tick - now
        } else {
            Duration::from_millis(0)
        };
        (self.next_tick, sleep)
    }
}
