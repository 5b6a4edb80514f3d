//!
//! SDL2 backed drivers.
//!
//! - `opengl`: the `gl` video driver, an SDL2 window with an OpenGL 2.1
//!   context rendering frames as a textured quad
//!
//! The matching input driver lives in `crate::input::sdl` and shares the SDL
//! context created here.

pub mod opengl;

use sdl2::Sdl;

use crate::driver::{DriverError, DriverResult};

/// Initialize SDL2 on behalf of the driver named `ident`.
pub(crate) fn init_context(ident: &'static str) -> DriverResult<Sdl> {
    sdl2::init().map_err(|e| DriverError::backend(ident, format!("SDL2 init: {}", e)))
}
