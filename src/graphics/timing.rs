//! Frame counting and FPS sampling.

use std::time::{Duration, Instant};

/// Frames between FPS samples.
pub const FPS_UPDATE_INTERVAL: u64 = 180;

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&mut self) -> Duration;
}

/// Wall clock based on `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// One FPS measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsSample {
    /// Frames per second over the last window.
    pub fps: f32,
    /// Frames counted before this sample.
    pub frames: u64,
}

impl FpsSample {
    /// Title text publishing this sample.
    #[must_use]
    pub fn title(&self, prefix: &str) -> String {
        format!("{} || FPS: {:6.1} || Frames: {}", prefix, self.fps, self.frames)
    }
}

/// Frame counter and the start of the current sampling window.
///
/// Lives as long as the render handle; a fresh state starts a new window on
/// its first tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTimingState {
    frame_count: u64,
    window_start: Duration,
}

impl FrameTimingState {
    /// Fresh state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame_count: 0,
            window_start: Duration::ZERO,
        }
    }

    /// Frames counted so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Count one presented frame.
    ///
    /// Returns a sample whenever the count reaches a non-zero multiple of
    /// `FPS_UPDATE_INTERVAL`, measured over the frames since the previous
    /// sample.
    pub fn tick(&mut self, clock: &mut dyn Clock) -> Option<FpsSample> {
        let mut sample = None;

        if self.frame_count == 0 {
            self.window_start = clock.now();
        } else if self.frame_count % FPS_UPDATE_INTERVAL == 0 {
            let now = clock.now();
            let elapsed = now.saturating_sub(self.window_start).as_secs_f32();
            self.window_start = now;
            let fps = if elapsed > 0.0 {
                FPS_UPDATE_INTERVAL as f32 / elapsed
            } else {
                0.0
            };
            sample = Some(FpsSample {
                fps,
                frames: self.frame_count,
            });
        }

        self.frame_count = self.frame_count.wrapping_add(1);
        sample
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Clock advancing by a fixed step on every read.
    pub(crate) struct StepClock {
        pub(crate) now: Duration,
        pub(crate) step: Duration,
    }

    impl StepClock {
        pub(crate) fn new(step: Duration) -> Self {
            Self {
                now: Duration::ZERO,
                step,
            }
        }
    }

    impl Clock for StepClock {
        fn now(&mut self) -> Duration {
            let now = self.now;
            self.now += self.step;
            now
        }
    }

    /// Clock that only moves when told to.
    struct ManualClock(Duration);

    impl Clock for ManualClock {
        fn now(&mut self) -> Duration {
            self.0
        }
    }

    #[test]
    fn test_samples_only_at_multiples_of_interval() {
        let mut timing = FrameTimingState::new();
        let mut clock = ManualClock(Duration::ZERO);
        let mut sampled_at = Vec::new();

        for _ in 0..=(FPS_UPDATE_INTERVAL * 3) {
            let before = timing.frame_count();
            clock.0 += Duration::from_millis(10);
            if timing.tick(&mut clock).is_some() {
                sampled_at.push(before);
            }
        }

        assert_eq!(sampled_at, vec![180, 360, 540]);
    }

    #[test]
    fn test_fps_matches_known_delta() {
        let mut timing = FrameTimingState::new();
        let mut clock = ManualClock(Duration::ZERO);
        let delta = Duration::from_millis(10);
        let mut samples = Vec::new();

        for _ in 0..=FPS_UPDATE_INTERVAL * 2 {
            if let Some(sample) = timing.tick(&mut clock) {
                samples.push(sample);
            }
            clock.0 += delta;
        }

        assert_eq!(samples.len(), 2);
        let expected = FPS_UPDATE_INTERVAL as f32 / (delta.as_secs_f32() * FPS_UPDATE_INTERVAL as f32);
        for sample in &samples {
            assert!((sample.fps - expected).abs() < 0.01, "{sample:?}");
        }
        assert_eq!(samples[0].frames, 180);
        assert_eq!(samples[1].frames, 360);
    }

    #[test]
    fn test_first_tick_never_samples() {
        let mut timing = FrameTimingState::new();
        let mut clock = StepClock::new(Duration::from_secs(1));
        assert!(timing.tick(&mut clock).is_none());
        assert_eq!(timing.frame_count(), 1);
    }

    #[test]
    fn test_title_format() {
        let sample = FpsSample {
            fps: 59.94,
            frames: 180,
        };
        assert_eq!(sample.title("demo"), "demo || FPS:   59.9 || Frames: 180");
    }
}
