//! Input drivers
//!
//! An input driver pumps native events once per tick and answers button
//! queries for the two joypad ports.
//!
//! # Architecture
//!
//! - `InputBinds` maps each joypad button of a port to a keyboard scancode
//!   and a joystick button index
//! - `InputDriver::poll` turns native events into `InputEvent`s (quit,
//!   window resize, fast-forward toggles)
//! - `InputDriver::input_state` reports whether a bound button is held
//!
//! Built-in drivers, in priority order:
//! - `sdl`: SDL2 keyboard and joysticks (feature `opengl`)
//! - `null`: reports nothing

pub mod manager;
pub mod null;
#[cfg(feature = "opengl")]
pub mod sdl;

use crate::driver::{Driver, DriverDescriptor, DriverKind, DriverRegistry, DriverResult, NULL_IDENT};

pub use manager::InputManager;
pub use null::NullInput;

/// Number of joypad ports.
pub const MAX_PORTS: usize = 2;

/// Device classes a port can be queried for. Only `Joypad` reports state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDevice {
    /// Nothing plugged in.
    None,
    /// Standard joypad.
    Joypad,
    /// Mouse.
    Mouse,
}

/// Logical joypad buttons plus the frontend's fast-forward bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoypadButton {
    B,
    Y,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
    A,
    X,
    L,
    R,
    /// Held to present without vsync.
    FastForward,
}

/// One binding: a joypad button to a keyboard scancode and a joystick button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keybind {
    /// Bound button.
    pub button: JoypadButton,
    /// SDL scancode value, `None` when unbound.
    pub key: Option<i32>,
    /// Joystick button index, `None` when unbound.
    pub joykey: Option<u32>,
}

impl Keybind {
    /// Bind `button` to a scancode and a joystick button.
    #[must_use]
    pub const fn new(button: JoypadButton, key: Option<i32>, joykey: Option<u32>) -> Self {
        Self {
            button,
            key,
            joykey,
        }
    }

    /// Whether the bind is held, given the current key and joystick state.
    pub fn is_pressed(
        &self,
        key_down: &dyn Fn(i32) -> bool,
        joy_down: &dyn Fn(u32) -> bool,
    ) -> bool {
        self.key.is_some_and(key_down) || self.joykey.is_some_and(joy_down)
    }
}

/// USB HID scancodes, the numbering SDL2 uses.
pub mod scancode {
    pub const A: i32 = 4;
    pub const Q: i32 = 20;
    pub const S: i32 = 22;
    pub const W: i32 = 26;
    pub const X: i32 = 27;
    pub const Z: i32 = 29;
    pub const RETURN: i32 = 40;
    pub const SPACE: i32 = 44;
    pub const RIGHT: i32 = 79;
    pub const LEFT: i32 = 80;
    pub const DOWN: i32 = 81;
    pub const UP: i32 = 82;
    pub const RSHIFT: i32 = 229;
}

/// Binds for every port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinds {
    ports: [Vec<Keybind>; MAX_PORTS],
}

impl Default for InputBinds {
    /// Port 1 on the keyboard and the first joystick, port 2 on the second
    /// joystick only.
    fn default() -> Self {
        use JoypadButton::*;

        let keyboard: [(JoypadButton, i32, u32); 13] = [
            (A, scancode::X, 1),
            (B, scancode::Z, 0),
            (X, scancode::S, 3),
            (Y, scancode::A, 2),
            (L, scancode::Q, 4),
            (R, scancode::W, 5),
            (Start, scancode::RETURN, 7),
            (Select, scancode::RSHIFT, 6),
            (Up, scancode::UP, 11),
            (Down, scancode::DOWN, 12),
            (Left, scancode::LEFT, 13),
            (Right, scancode::RIGHT, 14),
            (FastForward, scancode::SPACE, 10),
        ];

        let port1 = keyboard
            .iter()
            .map(|&(button, key, joy)| Keybind::new(button, Some(key), Some(joy)))
            .collect();
        let port2 = keyboard
            .iter()
            .filter(|(button, _, _)| *button != FastForward)
            .map(|&(button, _, joy)| Keybind::new(button, None, Some(joy)))
            .collect();

        Self {
            ports: [port1, port2],
        }
    }
}

impl InputBinds {
    /// No binds at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ports: [Vec::new(), Vec::new()],
        }
    }

    /// Binds of `port`, empty for an unknown port.
    #[must_use]
    pub fn port(&self, port: usize) -> &[Keybind] {
        self.ports.get(port).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add or replace the bind for `bind.button` on `port`.
    pub fn set(&mut self, port: usize, bind: Keybind) {
        let Some(binds) = self.ports.get_mut(port) else {
            return;
        };
        match binds.iter_mut().find(|b| b.button == bind.button) {
            Some(existing) => *existing = bind,
            None => binds.push(bind),
        }
    }

    /// First bind for `button` on `port`.
    #[must_use]
    pub fn find(&self, port: usize, button: JoypadButton) -> Option<&Keybind> {
        self.port(port).iter().find(|b| b.button == button)
    }

    /// Resolve a button query against the current key and joystick state.
    ///
    /// Returns 1 when any bind for `button` on `port` is held, else 0.
    pub fn state(
        &self,
        port: usize,
        button: JoypadButton,
        key_down: &dyn Fn(i32) -> bool,
        joy_down: &dyn Fn(u32) -> bool,
    ) -> i16 {
        let held = self
            .port(port)
            .iter()
            .filter(|b| b.button == button)
            .any(|b| b.is_pressed(key_down, joy_down));
        i16::from(held)
    }
}

/// Something that happened during `poll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The user asked to quit.
    Quit,
    /// The window's drawable size changed.
    Resized { width: u32, height: u32 },
    /// The fast-forward bind was pressed (`true`) or released (`false`).
    FastForward(bool),
}

/// Turns the fast-forward bind's level into edge events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastForwardTracker {
    pressed: bool,
}

impl FastForwardTracker {
    /// Whether fast-forward is held.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Record the current level; returns an event when it changed.
    pub fn update(&mut self, pressed: bool) -> Option<InputEvent> {
        if pressed == self.pressed {
            return None;
        }
        self.pressed = pressed;
        Some(InputEvent::FastForward(pressed))
    }
}

/// Input capability implemented by each backend.
pub trait InputDriver: Driver {
    /// Pump native events. Called once per tick.
    fn poll(&mut self, binds: &InputBinds) -> Vec<InputEvent>;

    /// 1 when `button` is held on `port`, else 0. Only joypads report state.
    fn input_state(
        &self,
        binds: &InputBinds,
        port: usize,
        device: InputDevice,
        index: u32,
        button: JoypadButton,
    ) -> i16;
}

/// Init operation stored in the input registry.
pub type InputInitFn = fn() -> DriverResult<Box<dyn InputDriver>>;

/// Registry of input drivers compiled into this build.
pub fn registry() -> DriverRegistry<InputInitFn> {
    #[allow(unused_mut)]
    let mut preferred = Vec::new();
    #[cfg(feature = "opengl")]
    preferred.push(DriverDescriptor::new(sdl::IDENT, sdl::init as InputInitFn));

    DriverRegistry::new(
        DriverKind::Input,
        preferred,
        DriverDescriptor::new(NULL_IDENT, null::init as InputInitFn),
    )
}
