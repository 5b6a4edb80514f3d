// mediafront library
// Driver registries, lifecycles and the video frame pipeline

pub mod camera;
pub mod cli;
pub mod config;
pub mod driver;
pub mod drivers;
pub mod graphics;
pub mod input;
pub mod logging;
pub mod message;
pub mod propfile;

pub use cli::Cli;
pub use config::Options;
pub use drivers::Drivers;
pub use logging::LogLevel;
