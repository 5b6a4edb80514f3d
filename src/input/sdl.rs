//! SDL2 input driver: keyboard plus up to two joysticks.

use sdl2::{
    event::{Event, WindowEvent},
    joystick::Joystick,
    keyboard::Scancode,
    EventPump, JoystickSubsystem, Sdl,
};
use tracing::{debug, info, warn};

use crate::driver::{Driver, DriverError, DriverResult};
use crate::graphics::sdl::init_context;

use super::{
    FastForwardTracker, InputBinds, InputDevice, InputDriver, InputEvent, JoypadButton, MAX_PORTS,
};

/// Registry identifier.
pub const IDENT: &str = "sdl";

/// Input bound to an SDL context, usually the one owning the video window.
pub struct SdlInput {
    _sdl: Sdl,
    event_pump: EventPump,
    _joystick_subsystem: Option<JoystickSubsystem>,
    joypads: Vec<Joystick>,
    fast_forward: FastForwardTracker,
}

impl std::fmt::Debug for SdlInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdlInput")
            .field("joypads", &self.joypads.len())
            .field("fast_forward", &self.fast_forward)
            .finish_non_exhaustive()
    }
}

impl SdlInput {
    /// Take the event pump of `sdl` and open the first joysticks present.
    pub fn from_context(sdl: &Sdl) -> DriverResult<Self> {
        let event_pump = sdl
            .event_pump()
            .map_err(|e| DriverError::backend(IDENT, format!("event pump: {}", e)))?;

        let (joystick_subsystem, joypads) = match sdl.joystick() {
            Ok(subsystem) => {
                let joypads = open_joypads(&subsystem);
                (Some(subsystem), joypads)
            }
            Err(e) => {
                warn!(error = %e, "joystick subsystem unavailable, keyboard only");
                (None, Vec::new())
            }
        };

        Ok(Self {
            _sdl: sdl.clone(),
            event_pump,
            _joystick_subsystem: joystick_subsystem,
            joypads,
            fast_forward: FastForwardTracker::default(),
        })
    }

    fn key_down(&self, key: i32) -> bool {
        Scancode::from_i32(key)
            .is_some_and(|sc| self.event_pump.keyboard_state().is_scancode_pressed(sc))
    }

    fn joy_down(&self, port: usize, button: u32) -> bool {
        self.joypads
            .get(port)
            .is_some_and(|pad| button < pad.num_buttons() && pad.button(button).unwrap_or(false))
    }

    fn held(&self, binds: &InputBinds, port: usize, button: JoypadButton) -> i16 {
        binds.state(
            port,
            button,
            &|key| self.key_down(key),
            &|joy| self.joy_down(port, joy),
        )
    }
}

fn open_joypads(subsystem: &JoystickSubsystem) -> Vec<Joystick> {
    let available = match subsystem.num_joysticks() {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "failed to count joysticks");
            return Vec::new();
        }
    };

    let mut joypads = Vec::new();
    for index in 0..available {
        if joypads.len() == MAX_PORTS {
            break;
        }
        match subsystem.open(index) {
            Ok(pad) => {
                info!(index, name = %pad.name(), buttons = pad.num_buttons(), "opened joypad");
                joypads.push(pad);
            }
            Err(e) => debug!(index, error = %e, "skipping joystick"),
        }
    }
    joypads
}

/// Registry init operation: a private SDL context without a window.
pub fn init() -> DriverResult<Box<dyn InputDriver>> {
    let sdl = init_context(IDENT)?;
    Ok(Box::new(SdlInput::from_context(&sdl)?))
}

impl Driver for SdlInput {
    fn ident(&self) -> &'static str {
        IDENT
    }

    fn free(&mut self) {
        self.joypads.clear();
    }
}

impl InputDriver for SdlInput {
    fn poll(&mut self, binds: &InputBinds) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h) | WindowEvent::Resized(w, h),
                    ..
                } => events.push(InputEvent::Resized {
                    width: w.max(0) as u32,
                    height: h.max(0) as u32,
                }),
                _ => {}
            }
        }

        let pressed = self.held(binds, 0, JoypadButton::FastForward) != 0;
        if let Some(event) = self.fast_forward.update(pressed) {
            events.push(event);
        }
        events
    }

    fn input_state(
        &self,
        binds: &InputBinds,
        port: usize,
        device: InputDevice,
        _index: u32,
        button: JoypadButton,
    ) -> i16 {
        if device != InputDevice::Joypad {
            return 0;
        }
        self.held(binds, port, button)
    }
}
