mod common;

mod tests {
    use joystick_dimmer::{
        AnalogSampler, BorderStyle, ConfigError, ControlLoop, DebounceFilter, Duration,
        EventQueue, InputEvent, InputRouter, Instant, JoystickConfig, LedDuty, LogicalButton,
        NoDisplay, OutputBank, OutputState, OutputStateMachine, RectStyle, SharedState, Timestamp,
    };

    use super::common::{DrawOp, MockDisplay, MockInputs, MockLeds, MockSampler, VecSink};

    const QUEUE_SIZE: usize = 8;

    /// Everything the button handlers and the loop share
    struct Shared {
        state: SharedState,
        outputs: OutputBank<MockLeds>,
        events: EventQueue<InputEvent, QUEUE_SIZE>,
        debounce: DebounceFilter,
    }

    impl Shared {
        fn new(config: &JoystickConfig) -> Self {
            Self {
                state: SharedState::new(config.initial_state),
                outputs: OutputBank::new(MockLeds::default()),
                events: EventQueue::new(),
                debounce: DebounceFilter::from_config(config),
            }
        }

        fn machine(&self) -> OutputStateMachine<'_, MockLeds, QUEUE_SIZE> {
            OutputStateMachine::new(&self.state, &self.outputs, &self.events)
        }

        fn router(&self, config: &JoystickConfig) -> InputRouter<'_, MockLeds, QUEUE_SIZE> {
            InputRouter::new(config, &self.debounce, self.machine())
        }

        fn control<S: AnalogSampler>(
            &self,
            config: &JoystickConfig,
            sampler: S,
        ) -> ControlLoop<'_, S, MockInputs, MockLeds, VecSink, QUEUE_SIZE> {
            ControlLoop::new(
                config,
                self.machine(),
                sampler,
                MockInputs::default(),
                VecSink::default(),
                NoDisplay,
            )
            .unwrap()
        }

        fn display_control(
            &self,
            config: &JoystickConfig,
            sampler: MockSampler,
        ) -> ControlLoop<'_, MockSampler, MockInputs, MockLeds, VecSink, QUEUE_SIZE, MockDisplay>
        {
            ControlLoop::new(
                config,
                self.machine(),
                sampler,
                MockInputs::default(),
                VecSink::default(),
                MockDisplay::default(),
            )
            .unwrap()
        }
    }

    #[test]
    fn test_tick_applies_mapped_duties() {
        let config = JoystickConfig::DEFAULT;
        let shared = Shared::new(&config);
        let mut control = shared.control(&config, MockSampler::new(2200, 0));

        let report = control.tick(Instant::from_millis(10_000));
        assert_eq!(report.applied, Some(LedDuty::new(304, 4095)));
        assert_eq!(shared.outputs.duty(), LedDuty::new(304, 4095));
        shared.outputs.with_driver(|leds| {
            assert_eq!((leds.red, leds.blue), (304, 4095));
        });

        // Stick at rest
        control.sampler_mut().set(2048, 2048);
        let report = control.tick(Instant::from_millis(10_100));
        assert_eq!(report.applied, Some(LedDuty::OFF));
    }

    #[test]
    fn test_start_powers_leds_and_logs_banner() {
        let config = JoystickConfig::DEFAULT;
        let shared = Shared::new(&config);
        let mut control = shared.control(&config, MockSampler::new(2048, 2048));

        control.start();
        assert_eq!(shared.outputs.duty(), LedDuty::new(100, 100));
        assert!(!shared.outputs.with_driver(|leds| leds.green));
        assert_eq!(control.sink().lines, ["Joystick started"]);

        // First tick replaces the power-on duty
        control.tick(Instant::from_millis(1_000));
        assert_eq!(shared.outputs.duty(), LedDuty::OFF);
    }

    #[test]
    fn test_start_follows_initial_state() {
        let config = JoystickConfig {
            initial_state: OutputState {
                pwm_enabled: false,
                green_led_on: true,
                ..OutputState::POWER_ON
            },
            ..JoystickConfig::WITH_DISPLAY
        };
        let shared = Shared::new(&config);
        let mut control = shared.display_control(&config, MockSampler::new(2048, 2048));

        control.start();
        assert_eq!(shared.outputs.duty(), LedDuty::OFF);
        assert!(shared.outputs.with_driver(|leds| leds.green));

        let display = config.display.unwrap();
        assert_eq!(
            control.display().unwrap().ops,
            [
                DrawOp::Clear,
                DrawOp::Rect(display.bounds(), RectStyle::Outline),
                DrawOp::Present,
            ]
        );
    }

    #[test]
    fn test_disabled_pwm_is_left_dark() {
        let config = JoystickConfig::DEFAULT;
        let shared = Shared::new(&config);
        let router = shared.router(&config);
        let mut control = shared.control(&config, MockSampler::new(0, 0));

        control.tick(Instant::from_millis(1_000));
        assert_eq!(shared.outputs.duty(), LedDuty::new(4095, 4095));

        router.on_button(LogicalButton::Primary, Timestamp::from_millis(1_050));
        // Dark before the next tick runs
        assert_eq!(shared.outputs.duty(), LedDuty::OFF);

        let writes = shared.outputs.with_driver(|leds| leds.writes.len());
        let report = control.tick(Instant::from_millis(1_100));
        assert_eq!(report.applied, None);
        assert!(!report.state.pwm_enabled);
        assert_eq!(shared.outputs.with_driver(|leds| leds.writes.len()), writes);

        let lines = &control.sink().lines;
        assert!(lines.iter().any(|line| line == "Button A pressed! PWM off"));
        assert!(lines.last().is_some_and(|line| line.contains("PWM: off")));
    }

    /// Sampler that presses the primary button while the tick is sampling,
    /// like an interrupt arriving between the ADC read and the PWM write
    struct PressingSampler<'r> {
        router: &'r InputRouter<'r, MockLeds, QUEUE_SIZE>,
        press_at: Option<Timestamp>,
    }

    impl AnalogSampler for PressingSampler<'_> {
        fn read(&mut self, _channel: u8) -> u16 {
            if let Some(now) = self.press_at.take() {
                self.router.on_button(LogicalButton::Primary, now);
            }
            0
        }
    }

    #[test]
    fn test_disable_during_tick_is_not_overwritten() {
        let config = JoystickConfig::DEFAULT;
        let shared = Shared::new(&config);
        let router = shared.router(&config);
        let sampler = PressingSampler {
            router: &router,
            press_at: None,
        };
        let mut control = shared.control(&config, sampler);

        let report = control.tick(Instant::from_millis(1_000));
        assert_eq!(report.applied, Some(LedDuty::new(4095, 4095)));

        control.sampler_mut().press_at = Some(Timestamp::from_millis(1_050));
        let report = control.tick(Instant::from_millis(1_100));
        assert_eq!(report.sample.x, 0);
        assert_eq!(report.applied, None);
        assert!(!report.state.pwm_enabled);
        assert_eq!(shared.outputs.duty(), LedDuty::OFF);
        shared.outputs.with_driver(|leds| {
            assert_eq!((leds.red, leds.blue), (0, 0));
        });
    }

    #[test]
    fn test_status_line_per_tick() {
        let config = JoystickConfig::DEFAULT;
        let shared = Shared::new(&config);
        let mut control = shared.control(&config, MockSampler::new(2200, 2048));

        for n in 0..3 {
            control.tick(Instant::from_millis(1_000 + n * 100));
        }
        let lines = &control.sink().lines;
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "X: 2200, Y: 2048, A: 1, B: 1, red: 304, blue: 0, PWM: on, green LED: off, border: 0"
        );

        // A held down pulls its line low
        control.inputs_mut().held.push(config.buttons.primary);
        control.tick(Instant::from_millis(1_300));
        let line = control.sink().lines.last().unwrap();
        assert!(line.contains("A: 0, B: 1"), "{line}");
    }

    #[test]
    fn test_pacing() {
        let config = JoystickConfig::DEFAULT;
        let shared = Shared::new(&config);
        let mut control = shared.control(&config, MockSampler::new(2048, 2048));
        assert_eq!(control.period(), Duration::from_millis(100));

        let report = control.tick(Instant::from_millis(1_000));
        assert_eq!(report.next_deadline, Instant::from_millis(1_100));
        assert_eq!(report.sleep_duration, Duration::from_millis(100));

        // Tick ran late but within the drift limit: keep the schedule
        let report = control.tick(Instant::from_millis(1_130));
        assert_eq!(report.next_deadline, Instant::from_millis(1_200));
        assert_eq!(report.sleep_duration, Duration::from_millis(70));

        // Far behind: restart from now
        let report = control.tick(Instant::from_millis(2_000));
        assert_eq!(report.next_deadline, Instant::from_millis(2_100));
        assert_eq!(report.sleep_duration, Duration::from_millis(100));
    }

    #[test]
    fn test_surface_must_match_config() {
        let config = JoystickConfig::WITH_DISPLAY;
        let shared = Shared::new(&config);

        let without_surface = ControlLoop::new(
            &config,
            shared.machine(),
            MockSampler::new(2048, 2048),
            MockInputs::default(),
            VecSink::default(),
            NoDisplay,
        );
        assert_eq!(without_surface.err(), Some(ConfigError::DisplayMismatch));

        let without_geometry = ControlLoop::new(
            &JoystickConfig::DEFAULT,
            shared.machine(),
            MockSampler::new(2048, 2048),
            MockInputs::default(),
            VecSink::default(),
            MockDisplay::default(),
        );
        assert_eq!(without_geometry.err(), Some(ConfigError::DisplayMismatch));

        let invalid = ControlLoop::new(
            &JoystickConfig {
                gain: 0,
                ..config
            },
            shared.machine(),
            MockSampler::new(2048, 2048),
            MockInputs::default(),
            VecSink::default(),
            MockDisplay::default(),
        );
        assert_eq!(invalid.err(), Some(ConfigError::ZeroGain));
    }

    #[test]
    fn test_display_frame_and_border_redraw() {
        let config = JoystickConfig::WITH_DISPLAY;
        let display = config.display.unwrap();
        let shared = Shared::new(&config);
        let router = shared.router(&config);
        let mut control = shared.display_control(&config, MockSampler::new(4095, 0));
        assert_eq!(control.period(), Duration::from_millis(50));

        control.tick(Instant::from_millis(1_000));
        let first = display.indicator(4095, 0);
        assert_eq!(
            control.display().unwrap().ops,
            [
                DrawOp::Clear,
                DrawOp::Rect(display.bounds(), RectStyle::Outline),
                DrawOp::Rect(first, RectStyle::Filled),
                DrawOp::Present,
            ]
        );
        // Stick fully right and down
        assert_eq!(display.indicator_position(4095, 0), (120, 56));

        router.on_button(LogicalButton::Joystick, Timestamp::from_millis(1_020));
        control.sampler_mut().set(2048, 2048);
        let report = control.tick(Instant::from_millis(1_050));
        assert_eq!(report.state.border_style, BorderStyle::Double);

        let second = display.indicator(2048, 2048);
        let bounds = display.bounds();
        // Border-only redraw, then the indicator moves without clearing the screen
        assert_eq!(
            control.display().unwrap().ops[4..],
            [
                DrawOp::Rect(bounds, RectStyle::Erase),
                DrawOp::Rect(bounds.inset(1), RectStyle::Erase),
                DrawOp::Rect(bounds.inset(2), RectStyle::Erase),
                DrawOp::Rect(bounds, RectStyle::Outline),
                DrawOp::Rect(bounds.inset(2), RectStyle::Outline),
                DrawOp::Present,
                DrawOp::Rect(first, RectStyle::Clear),
                DrawOp::Rect(bounds, RectStyle::Outline),
                DrawOp::Rect(bounds.inset(2), RectStyle::Outline),
                DrawOp::Rect(second, RectStyle::Filled),
                DrawOp::Present,
            ]
        );

        // Regular full frames again on the next tick
        control.tick(Instant::from_millis(1_100));
        assert_eq!(control.display().unwrap().ops[15], DrawOp::Clear);

        let lines = &control.sink().lines;
        assert!(lines.iter().any(|line| line == "Button SW pressed! green LED on, border 1"));
        // No B button on the display board
        assert!(lines.last().unwrap().contains("A: 1, B: -"));
    }
}
