//! Input lifecycle.

use tracing::debug;

use crate::driver::{DriverKind, DriverRegistry, DriverResult, Lifecycle, LifecycleState};

use super::{InputBinds, InputDevice, InputDriver, InputEvent, InputInitFn, JoypadButton};

/// Owns the input driver registry and the single live input handle.
#[derive(Debug)]
pub struct InputManager {
    registry: DriverRegistry<InputInitFn>,
    driver: String,
    lifecycle: Lifecycle<dyn InputDriver>,
}

impl InputManager {
    /// Create a manager selecting `driver` from `registry`.
    pub fn new(registry: DriverRegistry<InputInitFn>, driver: impl Into<String>) -> Self {
        Self {
            registry,
            driver: driver.into(),
            lifecycle: Lifecycle::new(DriverKind::Input),
        }
    }

    /// Registry this manager selects from.
    pub fn registry(&self) -> &DriverRegistry<InputInitFn> {
        &self.registry
    }

    /// Whether an input handle is live.
    pub fn is_live(&self) -> bool {
        self.lifecycle.is_live()
    }

    /// Lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Identifier of the live driver.
    pub fn ident(&self) -> Option<&'static str> {
        self.lifecycle.ident()
    }

    /// Take over a driver created by the video driver for its window.
    ///
    /// When a handle is already live the offered driver is freed and dropped.
    pub fn adopt(&mut self, mut driver: Box<dyn InputDriver>) -> DriverResult<()> {
        if self.lifecycle.is_live() {
            debug!(driver = driver.ident(), "input already live, freeing offered driver");
            driver.free();
            return Ok(());
        }
        debug!(driver = driver.ident(), "adopting input driver from video");
        self.lifecycle.init_with(|| Ok(driver))
    }

    /// Select and initialize an input driver from the registry.
    pub fn init(&mut self) -> DriverResult<()> {
        if self.lifecycle.is_live() {
            return Ok(());
        }
        let descriptor = self.registry.select_descriptor(&self.driver)?;
        self.lifecycle.init_with(descriptor.init)
    }

    /// Pump events. Empty without a live handle.
    pub fn poll(&mut self, binds: &InputBinds) -> Vec<InputEvent> {
        match self.lifecycle.handle_mut() {
            Some(input) => input.poll(binds),
            None => Vec::new(),
        }
    }

    /// Button query. 0 without a live handle.
    pub fn input_state(
        &self,
        binds: &InputBinds,
        port: usize,
        device: InputDevice,
        index: u32,
        button: JoypadButton,
    ) -> i16 {
        self.lifecycle
            .handle()
            .map_or(0, |input| input.input_state(binds, port, device, index, button))
    }

    /// Tear the input driver down.
    pub fn uninit(&mut self) {
        self.lifecycle.uninit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Driver, DriverDescriptor, NULL_IDENT};
    use crate::input::{null, NullInput};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Reports every button held and a quit on every poll.
    struct Pressed;

    impl Driver for Pressed {
        fn ident(&self) -> &'static str {
            "pressed"
        }
    }

    impl InputDriver for Pressed {
        fn poll(&mut self, _: &InputBinds) -> Vec<InputEvent> {
            vec![InputEvent::Quit]
        }

        fn input_state(
            &self,
            _: &InputBinds,
            _: usize,
            device: InputDevice,
            _: u32,
            _: JoypadButton,
        ) -> i16 {
            i16::from(device == InputDevice::Joypad)
        }
    }

    fn open_pressed() -> DriverResult<Box<dyn InputDriver>> {
        Ok(Box::new(Pressed))
    }

    fn test_registry() -> DriverRegistry<InputInitFn> {
        DriverRegistry::new(
            DriverKind::Input,
            vec![DriverDescriptor::new("pressed", open_pressed as InputInitFn)],
            DriverDescriptor::new(NULL_IDENT, null::init as InputInitFn),
        )
    }

    #[test]
    fn test_registry_driver() {
        let binds = InputBinds::default();
        let mut input = InputManager::new(test_registry(), "");
        assert!(input.poll(&binds).is_empty());
        assert_eq!(
            input.input_state(&binds, 0, InputDevice::Joypad, 0, JoypadButton::A),
            0
        );

        input.init().unwrap();
        assert_eq!(input.ident(), Some("pressed"));
        assert_eq!(input.poll(&binds), vec![InputEvent::Quit]);
        assert_eq!(
            input.input_state(&binds, 0, InputDevice::Joypad, 0, JoypadButton::A),
            1
        );
        assert_eq!(
            input.input_state(&binds, 0, InputDevice::Mouse, 0, JoypadButton::A),
            0
        );
    }

    #[test]
    fn test_adopted_driver_wins() {
        let mut input = InputManager::new(test_registry(), "pressed");
        input.adopt(Box::new(NullInput::new())).unwrap();
        input.init().unwrap();
        assert_eq!(input.ident(), Some("null"));
        assert_eq!(input.state(), LifecycleState::Active);

        input.uninit();
        assert!(!input.is_live());
    }

    /// Null input that records its teardown.
    struct Released(Rc<Cell<bool>>);

    impl Driver for Released {
        fn ident(&self) -> &'static str {
            "released"
        }

        fn free(&mut self) {
            self.0.set(true);
        }
    }

    impl InputDriver for Released {
        fn poll(&mut self, _: &InputBinds) -> Vec<InputEvent> {
            Vec::new()
        }

        fn input_state(&self, _: &InputBinds, _: usize, _: InputDevice, _: u32, _: JoypadButton) -> i16 {
            0
        }
    }

    #[test]
    fn test_adopt_while_live_frees_offered_driver() {
        let mut input = InputManager::new(test_registry(), "pressed");
        input.init().unwrap();

        let freed = Rc::new(Cell::new(false));
        input.adopt(Box::new(Released(Rc::clone(&freed)))).unwrap();
        assert!(freed.get());
        assert_eq!(input.ident(), Some("pressed"));
    }

    #[test]
    fn test_adopted_driver_freed_on_uninit() {
        let mut input = InputManager::new(test_registry(), "");
        let freed = Rc::new(Cell::new(false));
        input.adopt(Box::new(Released(Rc::clone(&freed)))).unwrap();
        assert!(!freed.get());
        input.uninit();
        assert!(freed.get());
    }
}
