//! Camera lifecycle: driver selection, init, start/stop/poll and teardown.

use tracing::{debug, warn};

use crate::driver::{
    DriverError, DriverKind, DriverRegistry, DriverResult, Lifecycle, LifecycleState,
};

use super::{CameraCallback, CameraDriver, CameraInitFn, CameraRequest, FrameSink};

/// Camera settings taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CameraSettings {
    /// Driver name; empty selects the first compiled-in driver.
    pub driver: String,
    /// Device hint; empty lets the driver choose.
    pub device: String,
    /// Width override; 0 keeps the consumer's default.
    pub width: u32,
    /// Height override; 0 keeps the consumer's default.
    pub height: u32,
    /// User permission to start capturing.
    pub allow: bool,
}

/// Owns the camera driver registry and the single live camera handle.
#[derive(Debug)]
pub struct CameraManager {
    registry: DriverRegistry<CameraInitFn>,
    settings: CameraSettings,
    callback: CameraCallback,
    lifecycle: Lifecycle<dyn CameraDriver>,
}

impl CameraManager {
    /// Create a manager over `registry`.
    pub fn new(registry: DriverRegistry<CameraInitFn>, settings: CameraSettings) -> Self {
        Self {
            registry,
            settings,
            callback: CameraCallback::default(),
            lifecycle: Lifecycle::new(DriverKind::Camera),
        }
    }

    /// Registry this manager selects from.
    pub fn registry(&self) -> &DriverRegistry<CameraInitFn> {
        &self.registry
    }

    /// Current settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Replace the settings. Takes effect at the next init.
    pub fn set_settings(&mut self, settings: CameraSettings) {
        self.settings = settings;
    }

    /// Install the consumer's request and listeners.
    pub fn set_callback(&mut self, mut callback: CameraCallback) {
        self.lifecycle
            .set_on_initialized(callback.on_initialized.take());
        self.lifecycle
            .set_on_deinitialized(callback.on_deinitialized.take());
        self.callback = callback;
    }

    /// Ask for the camera to be brought up at the next init.
    pub fn request(&mut self) {
        self.lifecycle.set_active(true);
    }

    /// Whether the camera is wanted and has not failed.
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Whether a camera handle is live.
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

    /// The request that `init` would hand to the driver.
    pub fn resolved_request(&self) -> CameraRequest<'_> {
        resolve(&self.settings, &self.callback)
    }

    /// Select and initialize the camera driver.
    ///
    /// No-op while a handle is live. A missing registry entry is fatal; a
    /// backend failure leaves the camera inactive and is returned for the
    /// caller to log or ignore.
    pub fn init(&mut self) -> DriverResult<()> {
        if self.lifecycle.is_live() {
            debug!("camera already initialized");
            return Ok(());
        }

        let descriptor = self.registry.select_descriptor(&self.settings.driver)?;
        let request = resolve(&self.settings, &self.callback);
        self.lifecycle.init_with(|| (descriptor.init)(&request))
    }

    /// Start capturing.
    ///
    /// Fails with `Disabled` when the user has not allowed the camera, even
    /// if a handle is live, and with `NotActive` when there is no handle.
    pub fn start(&mut self) -> DriverResult<()> {
        let allow = self.settings.allow;
        let Some(camera) = self.lifecycle.handle_mut() else {
            return Err(DriverError::NotActive(DriverKind::Camera));
        };

        if !allow {
            let err = DriverError::Disabled(DriverKind::Camera);
            warn!("{}", err);
            return Err(err);
        }

        camera.start()?;
        self.lifecycle.mark_running();
        Ok(())
    }

    /// Stop capturing. No-op without a handle.
    pub fn stop(&mut self) {
        if let Some(camera) = self.lifecycle.handle_mut() {
            camera.stop();
            self.lifecycle.mark_stopped();
        }
    }

    /// Poll the driver into `sink`. Returns whether a frame was delivered.
    pub fn poll(&mut self, sink: &mut dyn FrameSink) -> bool {
        match self.lifecycle.handle_mut() {
            Some(camera) => camera.poll(sink),
            None => false,
        }
    }

    /// Tear the camera down. No-op without a handle.
    pub fn uninit(&mut self) {
        self.lifecycle.uninit();
    }
}

/// Configured values win over the consumer's defaults when non-zero.
fn resolve<'a>(settings: &'a CameraSettings, callback: &CameraCallback) -> CameraRequest<'a> {
    CameraRequest {
        device: if settings.device.is_empty() {
            None
        } else {
            Some(settings.device.as_str())
        },
        caps: callback.caps,
        width: if settings.width != 0 {
            settings.width
        } else {
            callback.width
        },
        height: if settings.height != 0 {
            settings.height
        } else {
            callback.height
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{registry, CameraCaps};
    use crate::driver::{Driver, DriverDescriptor, NULL_IDENT};
    use serial_test::serial;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    static OPENED: AtomicUsize = AtomicUsize::new(0);
    static LAST_WIDTH: AtomicU32 = AtomicU32::new(0);
    static LAST_HEIGHT: AtomicU32 = AtomicU32::new(0);

    struct Recorder;

    impl Driver for Recorder {
        fn ident(&self) -> &'static str {
            "recorder"
        }
    }

    impl CameraDriver for Recorder {
        fn start(&mut self) -> DriverResult<()> {
            Ok(())
        }

        fn stop(&mut self) {}

        fn poll(&mut self, sink: &mut dyn FrameSink) -> bool {
            sink.raw_framebuffer(&[0xff], 1, 1, 4);
            true
        }
    }

    fn open_recorder(request: &CameraRequest<'_>) -> DriverResult<Box<dyn CameraDriver>> {
        OPENED.fetch_add(1, Ordering::SeqCst);
        LAST_WIDTH.store(request.width, Ordering::SeqCst);
        LAST_HEIGHT.store(request.height, Ordering::SeqCst);
        Ok(Box::new(Recorder))
    }

    fn open_busy(_: &CameraRequest<'_>) -> DriverResult<Box<dyn CameraDriver>> {
        Err(DriverError::backend("busy", "device busy"))
    }

    fn recorder_registry() -> DriverRegistry<CameraInitFn> {
        DriverRegistry::new(
            DriverKind::Camera,
            vec![
                DriverDescriptor::new("recorder", open_recorder as CameraInitFn),
                DriverDescriptor::new("busy", open_busy as CameraInitFn),
            ],
            DriverDescriptor::new(NULL_IDENT, crate::camera::null::init as CameraInitFn),
        )
    }

    fn settings(driver: &str, allow: bool) -> CameraSettings {
        CameraSettings {
            driver: driver.to_string(),
            allow,
            ..CameraSettings::default()
        }
    }

    struct Count(usize);

    impl FrameSink for Count {
        fn raw_framebuffer(&mut self, _: &[u32], _: u32, _: u32, _: usize) {
            self.0 += 1;
        }
    }

    #[test]
    #[serial]
    fn test_init_twice_opens_once() {
        OPENED.store(0, Ordering::SeqCst);
        let mut cam = CameraManager::new(recorder_registry(), settings("recorder", true));
        cam.init().unwrap();
        cam.init().unwrap();
        assert_eq!(OPENED.load(Ordering::SeqCst), 1);
        assert_eq!(cam.ident(), Some("recorder"));
    }

    #[test]
    #[serial]
    fn test_configured_size_overrides_consumer_default() {
        let mut cam = CameraManager::new(
            recorder_registry(),
            CameraSettings {
                driver: "recorder".to_string(),
                width: 1280,
                height: 0,
                ..CameraSettings::default()
            },
        );
        cam.set_callback(CameraCallback {
            caps: CameraCaps::RAW_FRAMEBUFFER,
            width: 320,
            height: 240,
            ..CameraCallback::default()
        });
        cam.init().unwrap();
        assert_eq!(LAST_WIDTH.load(Ordering::SeqCst), 1280);
        assert_eq!(LAST_HEIGHT.load(Ordering::SeqCst), 240);
    }

    #[test]
    fn test_resolved_request_device_hint() {
        let mut cam = CameraManager::new(registry(), CameraSettings::default());
        assert_eq!(cam.resolved_request().device, None);
        cam.set_settings(CameraSettings {
            device: "/dev/video2".to_string(),
            ..CameraSettings::default()
        });
        assert_eq!(cam.resolved_request().device, Some("/dev/video2"));
    }

    #[test]
    #[serial]
    fn test_unknown_driver_uses_first() {
        let mut cam = CameraManager::new(recorder_registry(), settings("v4l2", true));
        cam.init().unwrap();
        assert_eq!(cam.ident(), Some("recorder"));
    }

    #[test]
    fn test_start_disabled_even_with_handle() {
        let mut cam = CameraManager::new(registry(), settings("null", false));
        cam.init().unwrap();
        assert!(cam.is_live());
        assert_eq!(
            cam.start().unwrap_err(),
            DriverError::Disabled(DriverKind::Camera)
        );
    }

    #[test]
    fn test_start_without_handle_is_not_active() {
        let mut cam = CameraManager::new(registry(), settings("null", true));
        assert_eq!(
            cam.start().unwrap_err(),
            DriverError::NotActive(DriverKind::Camera)
        );
    }

    #[test]
    fn test_backend_failure_leaves_camera_inactive() {
        let mut cam = CameraManager::new(recorder_registry(), settings("busy", true));
        cam.request();
        assert!(cam.is_active());
        let err = cam.init().unwrap_err();
        assert!(!err.is_fatal());
        assert!(!cam.is_active());
        assert!(!cam.is_live());
        assert_eq!(cam.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_stop_and_poll_are_noops_without_handle() {
        let mut cam = CameraManager::new(registry(), settings("", true));
        let mut sink = Count(0);
        cam.stop();
        assert!(!cam.poll(&mut sink));
        cam.uninit();
        assert_eq!(sink.0, 0);
    }

    #[test]
    #[serial]
    fn test_poll_stop_restart() {
        let mut cam = CameraManager::new(recorder_registry(), settings("recorder", true));
        cam.init().unwrap();
        cam.start().unwrap();
        assert_eq!(cam.state(), LifecycleState::Active);

        let mut sink = Count(0);
        assert!(cam.poll(&mut sink));
        cam.stop();
        assert_eq!(cam.state(), LifecycleState::Stopped);
        cam.start().unwrap();
        assert_eq!(cam.state(), LifecycleState::Active);
        assert_eq!(sink.0, 1);
    }

    #[test]
    fn test_listener_order_on_teardown() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut cam = CameraManager::new(registry(), settings("pattern", true));
        let (a, b) = (Rc::clone(&log), Rc::clone(&log));
        cam.set_callback(CameraCallback {
            caps: CameraCaps::RAW_FRAMEBUFFER,
            width: 8,
            height: 8,
            on_initialized: Some(Box::new(move || a.borrow_mut().push("initialized"))),
            on_deinitialized: Some(Box::new(move || b.borrow_mut().push("deinitialized"))),
        });

        cam.init().unwrap();
        cam.uninit();
        cam.uninit();
        assert_eq!(log.borrow().as_slice(), &["initialized", "deinitialized"]);
    }
}
