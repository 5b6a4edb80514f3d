//! Input driver that reports nothing.

use crate::driver::{Driver, DriverResult, NULL_IDENT};

use super::{InputBinds, InputDevice, InputDriver, InputEvent, JoypadButton};

/// No-op input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInput;

impl NullInput {
    /// Create a null input driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Registry init operation.
pub fn init() -> DriverResult<Box<dyn InputDriver>> {
    Ok(Box::new(NullInput::new()))
}

impl Driver for NullInput {
    fn ident(&self) -> &'static str {
        NULL_IDENT
    }
}

impl InputDriver for NullInput {
    fn poll(&mut self, _binds: &InputBinds) -> Vec<InputEvent> {
        Vec::new()
    }

    fn input_state(
        &self,
        _binds: &InputBinds,
        _port: usize,
        _device: InputDevice,
        _index: u32,
        _button: JoypadButton,
    ) -> i16 {
        0
    }
}
