//! The frontend's driver set: one manager per kind plus shared state.

use tracing::{error, info, warn};

use crate::camera::{self, CameraCallback, CameraInitFn, CameraManager, FrameSink};
use crate::config::Options;
use crate::driver::{DriverError, DriverRegistry, DriverResult};
use crate::graphics::{self, VideoInitFn, VideoManager};
use crate::input::{self, InputBinds, InputEvent, InputInitFn, InputManager};
use crate::message::MessageQueue;

/// Priority of driver status messages.
pub const DRIVER_MESSAGE_PRIORITY: u32 = 1;
/// Frames a driver status message stays up.
pub const DRIVER_MESSAGE_FRAMES: u32 = 180;

/// Every driver kind the frontend runs, owned in one place.
///
/// Fields drop in declaration order, which is the reverse of init order.
#[derive(Debug)]
pub struct Drivers {
    camera: CameraManager,
    input: InputManager,
    video: VideoManager,
    messages: MessageQueue,
    binds: InputBinds,
    camera_requested: bool,
}

/// Registries to select from, one per kind.
#[derive(Debug, Clone)]
pub struct Registries {
    pub video: DriverRegistry<VideoInitFn>,
    pub input: DriverRegistry<InputInitFn>,
    pub camera: DriverRegistry<CameraInitFn>,
}

impl Default for Registries {
    /// The drivers compiled into this build.
    fn default() -> Self {
        Self {
            video: graphics::registry(),
            input: input::registry(),
            camera: camera::registry(),
        }
    }
}

impl Drivers {
    /// Driver set over the compiled-in registries.
    pub fn new(opts: &Options) -> Self {
        Self::with_registries(Registries::default(), opts)
    }

    /// Driver set over explicit registries.
    pub fn with_registries(registries: Registries, opts: &Options) -> Self {
        Self {
            camera: CameraManager::new(registries.camera, opts.camera_settings()),
            input: InputManager::new(
                registries.input,
                opts.input_driver.clone().unwrap_or_default(),
            ),
            video: VideoManager::new(
                registries.video,
                opts.video_driver.clone().unwrap_or_default(),
                opts.video_info(),
            ),
            messages: MessageQueue::default(),
            binds: InputBinds::default(),
            camera_requested: opts.camera_request.unwrap_or(false),
        }
    }

    /// Video manager.
    pub fn video(&self) -> &VideoManager {
        &self.video
    }

    /// Video manager, mutably.
    pub fn video_mut(&mut self) -> &mut VideoManager {
        &mut self.video
    }

    /// Input manager.
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Camera manager.
    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    /// Camera manager, mutably.
    pub fn camera_mut(&mut self) -> &mut CameraManager {
        &mut self.camera
    }

    /// On-screen message queue.
    pub fn messages_mut(&mut self) -> &mut MessageQueue {
        &mut self.messages
    }

    /// Key binds.
    pub fn binds(&self) -> &InputBinds {
        &self.binds
    }

    /// Replace the key binds.
    pub fn set_binds(&mut self, binds: InputBinds) {
        self.binds = binds;
    }

    /// Ask for the camera at the next init, with the consumer's callback.
    pub fn request_camera(&mut self, callback: CameraCallback) {
        self.camera.set_callback(callback);
        self.camera_requested = true;
    }

    /// Bring up video, then input, then the camera if requested.
    ///
    /// Only fatal errors are returned. A kind whose backend fails is logged
    /// and left inactive.
    pub fn init(&mut self) -> DriverResult<()> {
        match self.video.init() {
            Ok(Some(bound)) => {
                if let Err(err) = self.input.adopt(bound) {
                    warn!(error = %err, "video driver's input could not be adopted");
                }
            }
            Ok(None) => {}
            Err(err) => keep_going(err)?,
        }

        if !self.input.is_live() {
            if let Err(err) = self.input.init() {
                keep_going(err)?;
            }
        }

        if self.camera_requested {
            self.camera.request();
            if let Err(err) = self.camera.init() {
                keep_going(err)?;
            }
        }

        info!(
            video = self.video.ident().unwrap_or("-"),
            input = self.input.ident().unwrap_or("-"),
            camera = self.camera.ident().unwrap_or("-"),
            "drivers initialized"
        );
        Ok(())
    }

    /// Start the camera, queueing a message when the user disabled it.
    pub fn start_camera(&mut self) -> DriverResult<()> {
        match self.camera.start() {
            Err(err @ DriverError::Disabled(_)) => {
                self.messages
                    .push(err.to_string(), DRIVER_MESSAGE_PRIORITY, DRIVER_MESSAGE_FRAMES);
                Err(err)
            }
            other => other,
        }
    }

    /// Poll the camera into `sink`.
    pub fn poll_camera(&mut self, sink: &mut dyn FrameSink) -> bool {
        self.camera.poll(sink)
    }

    /// Pump input and apply window and fast-forward events to video.
    ///
    /// Returns every event so the caller can act on `Quit`.
    pub fn poll_input(&mut self) -> Vec<InputEvent> {
        let events = self.input.poll(&self.binds);
        for event in &events {
            match *event {
                InputEvent::Resized { width, height } => self.video.resize(width, height),
                InputEvent::FastForward(on) => self.video.set_nonblock_state(on),
                InputEvent::Quit => {}
            }
        }
        events
    }

    /// Tear every kind down in reverse init order. Safe to call twice.
    pub fn uninit(&mut self) {
        self.camera.uninit();
        self.input.uninit();
        self.video.uninit();
    }
}

impl Drop for Drivers {
    fn drop(&mut self) {
        self.uninit();
    }
}

/// Pass fatal errors up, log the rest.
fn keep_going(err: DriverError) -> DriverResult<()> {
    if err.is_fatal() {
        error!(error = %err, "fatal driver error");
        return Err(err);
    }
    error!(error = %err, "driver failed to initialize");
    Ok(())
}
