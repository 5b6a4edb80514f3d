//! End-to-end tests for driver selection, lifecycles and frame delivery,
//! run entirely on the null and pattern drivers.

use std::io::Write;

use clap::Parser;
use proptest::prelude::*;
use rstest::rstest;
use tempfile::NamedTempFile;

use mediafront::camera::{self, CameraCallback, CameraCaps, FrameSink};
use mediafront::config::load_config;
use mediafront::driver::{DriverError, DriverKind, LifecycleState};
use mediafront::graphics::{compute_viewport, PixelFormat};
use mediafront::input::InputEvent;
use mediafront::{Cli, Drivers, Options};

fn null_options() -> Options {
    Options {
        video_driver: Some("null".to_string()),
        input_driver: Some("null".to_string()),
        camera_driver: Some("pattern".to_string()),
        ..Options::default()
    }
}

#[derive(Default)]
struct Frames {
    count: usize,
    last: Vec<u32>,
    size: (u32, u32, usize),
}

impl FrameSink for Frames {
    fn raw_framebuffer(&mut self, pixels: &[u32], width: u32, height: u32, pitch: usize) {
        self.count += 1;
        self.last = pixels.to_vec();
        self.size = (width, height, pitch);
    }
}

#[rstest]
#[case("pattern", 0)]
#[case("PATTERN", 0)]
#[case("null", 1)]
#[case("Null", 1)]
#[case("", 0)]
#[case("v4l2", 0)]
fn camera_registry_selection(#[case] name: &str, #[case] expected: usize) {
    assert_eq!(camera::registry().select(name), Ok(expected));
}

#[test]
fn every_builtin_registry_ends_with_null() {
    assert!(camera::registry().ends_with_null());
    assert!(mediafront::graphics::registry().ends_with_null());
    assert!(mediafront::input::registry().ends_with_null());
    assert_eq!(camera::registry().options(), "pattern|null");
}

#[test]
fn null_drivers_run_and_tear_down() {
    let mut drivers = Drivers::new(&null_options());
    drivers.init().unwrap();
    assert_eq!(drivers.video().state(), LifecycleState::Active);

    // 4x2 XRGB1555 frame with two bytes of row padding
    let frame = vec![0u8; 10 * 2];
    for _ in 0..5 {
        drivers.video_mut().frame(&frame, 4, 2, 10).unwrap();
    }
    assert!(drivers.poll_input().is_empty());

    drivers.uninit();
    assert_eq!(drivers.video().state(), LifecycleState::Uninitialized);
    assert_eq!(drivers.input().ident(), None);
    // Frames after teardown are dropped quietly.
    drivers.video_mut().frame(&frame, 4, 2, 10).unwrap();
}

#[test]
fn malformed_frame_is_rejected_by_the_pipeline() {
    let mut drivers = Drivers::new(&null_options());
    drivers.init().unwrap();
    let err = drivers.video_mut().frame(&[0u8; 4], 4, 2, 8).unwrap_err();
    assert!(matches!(err, DriverError::InvalidFrame(_)));
}

#[test]
fn pattern_camera_streams_into_video() {
    let mut drivers = Drivers::new(&Options {
        camera_allow: Some(true),
        camera_width: Some(64),
        camera_height: Some(32),
        ..null_options()
    });
    drivers
        .video_mut()
        .set_info(null_options().video_info().with_pixel_format(PixelFormat::Xrgb8888));
    drivers.request_camera(CameraCallback {
        caps: CameraCaps::RAW_FRAMEBUFFER,
        ..CameraCallback::default()
    });
    drivers.init().unwrap();

    let mut sink = Frames::default();
    assert!(!drivers.poll_camera(&mut sink), "not started yet");

    drivers.start_camera().unwrap();
    assert!(drivers.camera().is_active());
    for _ in 0..3 {
        assert!(drivers.poll_camera(&mut sink));
        let bytes: &[u8] = bytemuck::cast_slice(&sink.last);
        let (w, h, pitch) = sink.size;
        drivers.video_mut().frame(bytes, w, h, pitch).unwrap();
    }
    assert_eq!(sink.count, 3);
    assert_eq!(sink.size, (64, 32, 256));

    drivers.camera_mut().stop();
    assert!(!drivers.poll_camera(&mut sink));
    assert_eq!(sink.count, 3);
}

#[test]
fn disallowed_camera_reports_once_through_messages() {
    let mut drivers = Drivers::new(&Options {
        camera_request: Some(true),
        ..null_options()
    });
    drivers.init().unwrap();
    assert!(drivers.camera().is_live());

    assert_eq!(
        drivers.start_camera(),
        Err(DriverError::Disabled(DriverKind::Camera))
    );
    assert!(drivers.camera().is_live());

    let mut seen = 0;
    while let Some(text) = drivers.messages_mut().pull() {
        assert_eq!(text, "Camera is explicitly disabled.");
        seen += 1;
    }
    assert_eq!(seen, 180);
}

#[test]
fn config_file_and_flags_drive_selection() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# frontend").unwrap();
    writeln!(file, "video_driver = \"gl\"").unwrap();
    writeln!(file, "input_driver = null").unwrap();
    writeln!(file, "camera_driver = pattern").unwrap();
    writeln!(file, "camera_allow = false").unwrap();

    let cli = Cli::try_parse_from([
        "mediafront",
        "--video-driver",
        "NULL",
        "--camera",
        "--allow-camera",
        "--frames",
        "3",
    ])
    .unwrap();
    let options = cli
        .merge_into_options(load_config(file.path()).unwrap())
        .unwrap();
    assert_eq!(options.max_frames, Some(3));

    let mut drivers = Drivers::new(&options);
    drivers.init().unwrap();
    assert_eq!(drivers.video().ident(), Some("null"));
    assert_eq!(drivers.camera().ident(), Some("pattern"));
    drivers.start_camera().unwrap();
}

#[test]
fn unknown_driver_names_fall_back_to_first_entry() {
    let mut drivers = Drivers::new(&Options {
        camera_driver: Some("v4l2".to_string()),
        camera_request: Some(true),
        ..null_options()
    });
    drivers.init().unwrap();
    assert_eq!(drivers.camera().ident(), Some("pattern"));
    assert!(drivers.poll_input().iter().all(|e| *e != InputEvent::Quit));
}

proptest! {
    #[test]
    fn viewport_stays_inside_surface(width in 1u32..4096, height in 1u32..4096, aspect in 0.25f32..4.0) {
        let vp = compute_viewport(width, height, true, aspect);
        prop_assert!(vp.x >= 0 && vp.y >= 0);
        prop_assert!(vp.x + vp.width <= width as i32 + 1);
        prop_assert!(vp.y + vp.height <= height as i32 + 1);
    }

    #[test]
    fn viewport_without_aspect_is_full(width in 0u32..4096, height in 0u32..4096) {
        let vp = compute_viewport(width, height, false, 1.0);
        prop_assert!(vp.is_full(width, height));
    }
}
