//! Desktop simulator for joystick-dimmer
//!
//! Sliders stand in for the joystick potentiometers, buttons for the push
//! buttons. The same router and control loop as on the board drive simulated
//! LEDs and a 128x64 monochrome display.

use std::collections::VecDeque;

use eframe::egui::{self};
use joystick_dimmer::{
    AnalogSampler, ButtonMap, ConfigError, ControlLoop, DebounceFilter, DiagnosticSink,
    DigitalInput, DisplaySurface, EventQueue, InputEvent, InputRouter, Instant, JoystickConfig,
    LedDriver, MAX_DUTY, OutputBank, OutputStateMachine, PwmLed, Rect, RectStyle, SharedState,
    TimeSource, Timestamp,
};

/// Notification queue size
const EVENT_QUEUE_SIZE: usize = 16;

/// Display board with the optional B button wired
const CONFIG: JoystickConfig = JoystickConfig {
    buttons: ButtonMap {
        secondary: Some(6),
        ..JoystickConfig::WITH_DISPLAY.buttons
    },
    ..JoystickConfig::WITH_DISPLAY
};

const PANEL_WIDTH: usize = 128;
const PANEL_HEIGHT: usize = 64;

/// Size of a display pixel on screen
const PIXEL_SIZE: f32 = 4.0;

/// Size of a simulated LED on screen
const LED_SIZE: f32 = 48.0;

/// Number of log lines kept on screen
const LOG_LINES: usize = 14;

static STATE: SharedState = SharedState::new(CONFIG.initial_state);
static DEBOUNCE: DebounceFilter = DebounceFilter::from_config(&CONFIG);
static EVENTS: EventQueue<InputEvent, EVENT_QUEUE_SIZE> = EventQueue::new();
static OUTPUTS: OutputBank<SimLeds> = OutputBank::new(SimLeds::new());

/// Interrupt-side entry point, shared like an ISR would share it
static ROUTER: InputRouter<'static, SimLeds, EVENT_QUEUE_SIZE> = InputRouter::new(
    &CONFIG,
    &DEBOUNCE,
    OutputStateMachine::new(&STATE, &OUTPUTS, &EVENTS),
);

/// Microsecond counter backed by the host clock
struct SimClock;

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_instant(Instant::now())
    }
}

struct SimLeds {
    red: u16,
    blue: u16,
    green: bool,
}

impl SimLeds {
    const fn new() -> Self {
        Self {
            red: 0,
            blue: 0,
            green: false,
        }
    }
}

impl LedDriver for SimLeds {
    fn set_duty(&mut self, led: PwmLed, duty: u16) {
        match led {
            PwmLed::Red => self.red = duty,
            PwmLed::Blue => self.blue = duty,
        }
    }

    fn set_green(&mut self, on: bool) {
        self.green = on;
    }
}

/// Stick position set from the UI sliders
struct SimSampler {
    x: u16,
    y: u16,
}

impl AnalogSampler for SimSampler {
    fn read(&mut self, channel: u8) -> u16 {
        if channel == CONFIG.x_axis.channel {
            self.x
        } else {
            self.y
        }
    }
}

/// Button lines; a button reads low while the mouse holds it down
#[derive(Default)]
struct SimInputs {
    held: Option<u8>,
}

impl DigitalInput for SimInputs {
    fn get(&mut self, pin: u8) -> bool {
        self.held != Some(pin)
    }
}

type Framebuffer = [[bool; PANEL_WIDTH]; PANEL_HEIGHT];

/// Double-buffered monochrome panel
struct SimDisplay {
    back: Framebuffer,
    front: Framebuffer,
}

impl SimDisplay {
    fn new() -> Self {
        Self {
            back: [[false; PANEL_WIDTH]; PANEL_HEIGHT],
            front: [[false; PANEL_WIDTH]; PANEL_HEIGHT],
        }
    }

    fn set(&mut self, x: usize, y: usize, on: bool) {
        if let Some(pixel) = self.back.get_mut(y).and_then(|row| row.get_mut(x)) {
            *pixel = on;
        }
    }
}

impl DisplaySurface for SimDisplay {
    fn clear(&mut self) {
        self.back = [[false; PANEL_WIDTH]; PANEL_HEIGHT];
    }

    fn draw_rect(&mut self, rect: Rect, style: RectStyle) {
        let x0 = usize::from(rect.x);
        let y0 = usize::from(rect.y);
        let x1 = x0 + usize::from(rect.width);
        let y1 = y0 + usize::from(rect.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let edge = y == y0 || y + 1 == y1 || x == x0 || x + 1 == x1;
                match style {
                    RectStyle::Filled => self.set(x, y, true),
                    RectStyle::Outline if edge => self.set(x, y, true),
                    RectStyle::Clear => self.set(x, y, false),
                    RectStyle::Outline if edge => self.set(x, y, true),
                    RectStyle::Erase if edge => self.set(x, y, false),
                    RectStyle::Outline | RectStyle::Erase => {}
                }
            }
        }
    }

    fn draw_pixel(&mut self, x: u8, y: u8) {
        self.set(usize::from(x), usize::from(y), true);
    }

    fn present(&mut self) {
        self.front = self.back;
    }
}

/// Keeps the most recent status lines and echoes them to stdout
#[derive(Default)]
struct LogSink {
    lines: VecDeque<String>,
}

impl DiagnosticSink for LogSink {
    #[allow(clippy::print_stdout)]
    fn emit(&mut self, line: &str) {
        println!("{line}");
        if self.lines.len() == LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }
}

type SimLoop =
    ControlLoop<'static, SimSampler, SimInputs, SimLeds, LogSink, EVENT_QUEUE_SIZE, SimDisplay>;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_title("Joystick Dimmer Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "joystick-dimmer-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()?))),
    )
}

struct PreviewApp {
    control: SimLoop,
    /// Deadline of the next control-loop tick
    next_tick: Instant,
    /// Stick position shown by the sliders
    x: u16,
    y: u16,
}

impl PreviewApp {
    fn new() -> Result<Self, ConfigError> {
        let center = CONFIG.center;
        let mut control = ControlLoop::new(
            &CONFIG,
            OutputStateMachine::new(&STATE, &OUTPUTS, &EVENTS),
            SimSampler {
                x: center,
                y: center,
            },
            SimInputs::default(),
            LogSink::default(),
            SimDisplay::new(),
        )?;
        control.start();

        Ok(Self {
            control,
            next_tick: Instant::now(),
            x: center,
            y: center,
        })
    }

    fn press(pin: u8) {
        ROUTER.on_edge_now(pin, &SimClock);
    }

    /// Fire a burst of edges 1 ms apart, like a bouncing contact
    fn press_bouncy(pin: u8) {
        let now = SimClock.now();
        for n in 0..5 {
            ROUTER.on_edge(pin, Timestamp::from_micros(now.as_micros().wrapping_add(n * 1000)));
        }
    }

    fn update_loop(&mut self) {
        let now = Instant::now();
        if now < self.next_tick {
            return;
        }
        let sampler = self.control.sampler_mut();
        sampler.x = self.x;
        sampler.y = self.y;
        self.next_tick = self.control.tick(now).next_deadline;
    }

    fn led(ui: &mut egui::Ui, label: &str, color: egui::Color32) {
        ui.vertical(|ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(LED_SIZE, LED_SIZE), egui::Sense::hover());
            painter.rect_filled(response.rect, LED_SIZE / 2.0, color);
            ui.label(label);
        });
    }

    fn panel(ui: &mut egui::Ui, framebuffer: &Framebuffer) {
        #[allow(clippy::cast_precision_loss)]
        let size = egui::vec2(PANEL_WIDTH as f32 * PIXEL_SIZE, PANEL_HEIGHT as f32 * PIXEL_SIZE);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        painter.rect_filled(response.rect, 0.0, egui::Color32::BLACK);

        #[allow(clippy::cast_precision_loss)]
        for (y, row) in framebuffer.iter().enumerate() {
            for (x, _) in row.iter().enumerate().filter(|(_, on)| **on) {
                let rect = egui::Rect::from_min_size(
                    egui::pos2(origin.x + x as f32 * PIXEL_SIZE, origin.y + y as f32 * PIXEL_SIZE),
                    egui::vec2(PIXEL_SIZE, PIXEL_SIZE),
                );
                painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(120, 200, 255));
            }
        }
    }
}

/// Scale a 12-bit duty to an 8-bit color channel
#[allow(clippy::cast_possible_truncation)]
fn duty_to_channel(duty: u16) -> u8 {
    (u32::from(duty) * 255 / u32::from(MAX_DUTY)) as u8
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_loop();

        // Request continuous repaint so the loop keeps ticking
        ctx.request_repaint();

        let (red, blue, green) = OUTPUTS.with_driver(|leds| (leds.red, leds.blue, leds.green));
        let state = STATE.read_snapshot();
        let mut held = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <Stick>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("X:");
                        ui.add(egui::Slider::new(&mut self.x, 0..=MAX_DUTY));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Y:");
                        ui.add(egui::Slider::new(&mut self.y, 0..=MAX_DUTY));
                    });
                    if ui.button("Center").clicked() {
                        self.x = CONFIG.center;
                        self.y = CONFIG.center;
                    }
                });
                // </Stick>
                ui.add_space(16.0);
                // <Buttons>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        let buttons = [
                            ("A", Some(CONFIG.buttons.primary)),
                            ("SW", Some(CONFIG.buttons.joystick)),
                            ("B", CONFIG.buttons.secondary),
                        ];
                        for (label, pin) in buttons {
                            let Some(pin) = pin else { continue };
                            let response = ui.button(label);
                            if response.is_pointer_button_down_on() {
                                held = Some(pin);
                            }
                            if response.clicked() {
                                Self::press(pin);
                            }
                        }
                    });
                    ui.horizontal(|ui| {
                        if ui.button("A (bouncing)").clicked() {
                            Self::press_bouncy(CONFIG.buttons.primary);
                        }
                        if ui.button("SW (bouncing)").clicked() {
                            Self::press_bouncy(CONFIG.buttons.joystick);
                        }
                    });
                    ui.label(format!(
                        "PWM: {}  border: {}  revision: {}  dropped: {}",
                        if state.pwm_enabled { "on" } else { "off" },
                        state.border_style.index(),
                        state.revision,
                        EVENTS.dropped(),
                    ));
                });
                // </Buttons>
            });

            ui.add_space(8.0);

            ui.horizontal(|ui| {
                Self::led(ui, &format!("red {red}"), egui::Color32::from_rgb(duty_to_channel(red), 0, 0));
                Self::led(ui, &format!("blue {blue}"), egui::Color32::from_rgb(0, 0, duty_to_channel(blue)));
                let green_color = if green {
                    egui::Color32::from_rgb(0, 220, 0)
                } else {
                    egui::Color32::from_rgb(0, 40, 0)
                };
                Self::led(ui, "green", green_color);
            });

            ui.add_space(8.0);

            if let Some(display) = self.control.display() {
                Self::panel(ui, &display.front);
            }

            ui.add_space(8.0);

            for line in &self.control.sink().lines {
                ui.monospace(line);
            }
        });

        self.control.inputs_mut().held = held;
    }
}
