//! Presentation viewport for aspect-locked output.

/// Aspect ratio kept by default when aspect locking is on.
pub const DEFAULT_ASPECT: f32 = 4.0 / 3.0;

/// Region of the window the frame is drawn into, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Viewport {
    /// Viewport covering a whole `width` x `height` surface.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }

    /// Whether the viewport covers the whole `width` x `height` surface.
    #[must_use]
    pub const fn is_full(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width as i32 && self.height == height as i32
    }
}

/// Ratios are compared at three decimal digits so that sizes which are
/// nominally the desired aspect do not flicker between letterbox modes.
fn millis(ratio: f32) -> i32 {
    (ratio * 1000.0) as i32
}

/// Viewport for a `width` x `height` surface.
///
/// With `keep_aspect` off, or when the surface matches `desired_aspect` to
/// three decimal digits, the whole surface is used. A wider surface gets
/// pillarbox bars left and right, a taller one gets bars top and bottom.
#[must_use]
pub fn compute_viewport(width: u32, height: u32, keep_aspect: bool, desired_aspect: f32) -> Viewport {
    if !keep_aspect || width == 0 || height == 0 {
        return Viewport::full(width, height);
    }

    let device_aspect = width as f32 / height as f32;
    let w = width as f32;
    let h = height as f32;

    if millis(device_aspect) > millis(desired_aspect) {
        let delta = (desired_aspect / device_aspect - 1.0) / 2.0 + 0.5;
        Viewport {
            x: (w * (0.5 - delta)) as i32,
            y: 0,
            width: (2.0 * w * delta) as i32,
            height: height as i32,
        }
    } else if millis(device_aspect) < millis(desired_aspect) {
        let delta = (device_aspect / desired_aspect - 1.0) / 2.0 + 0.5;
        Viewport {
            x: 0,
            y: (h * (0.5 - delta)) as i32,
            width: width as i32,
            height: (2.0 * h * delta) as i32,
        }
    } else {
        Viewport::full(width, height)
    }
}
