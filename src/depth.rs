use crate::error::{RegistrationError, RegistrationResult};
use crate::types::Camera;

/// Raw samples carry an 11-bit magnitude below their flag bits.
pub const DEPTH_MASK: u16 = 0x07FF;
/// Masked value meaning "no valid reading".
pub const DEPTH_SENTINEL: u16 = 2047;

/// Fallback order when the center pixel is invalid:
/// right, left, down, up, up-left, up-right, down-left, down-right.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// One camera's grid of raw depth samples, row major.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> RegistrationResult<DepthFrame> {
        if data.len() != width * height {
            return Err(RegistrationError::FrameBufferSize {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(DepthFrame {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, raw: u16) -> DepthFrame {
        DepthFrame {
            width,
            height,
            data: vec![raw; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn raw(&self) -> &[u16] {
        &self.data
    }

    pub fn set_raw(&mut self, x: usize, y: usize, raw: u16) {
        self.data[y * self.width + x] = raw;
    }

    /// Masked depth at `(x, y)`, `None` outside the frame.
    #[inline]
    pub fn masked(&self, x: i64, y: i64) -> Option<u16> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize] & DEPTH_MASK)
    }

    /// Depth at `(x, y)`, falling back to the first valid 8-neighbor.
    ///
    /// Returns the sentinel when the whole 3x3 neighborhood is invalid.
    /// Neighbors outside the frame count as invalid.
    pub fn sample(&self, x: i64, y: i64) -> f32 {
        if let Some(d) = self.masked(x, y).filter(|d| *d != DEPTH_SENTINEL) {
            return d as f32;
        }
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if let Some(d) = self.masked(x + dx, y + dy).filter(|d| *d != DEPTH_SENTINEL) {
                log::trace!("depth at ({}, {}) taken from ({}, {})", x, y, x + dx, y + dy);
                return d as f32;
            }
        }
        DEPTH_SENTINEL as f32
    }
}

pub fn is_sentinel(depth: f32) -> bool {
    depth >= DEPTH_SENTINEL as f32
}

/// The depth frames of both cameras for one registration pass.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub a: DepthFrame,
    pub b: DepthFrame,
}

impl FramePair {
    /// Both frames must match the expected image geometry.
    pub fn new(
        a: DepthFrame,
        b: DepthFrame,
        width: usize,
        height: usize,
    ) -> RegistrationResult<FramePair> {
        for (camera, frame) in [(Camera::A, &a), (Camera::B, &b)] {
            if frame.width != width || frame.height != height {
                return Err(RegistrationError::FrameSizeMismatch {
                    camera,
                    expected_w: width,
                    expected_h: height,
                    actual_w: frame.width,
                    actual_h: frame.height,
                });
            }
        }
        Ok(FramePair { a, b })
    }

    pub fn frame(&self, camera: Camera) -> &DepthFrame {
        match camera {
            Camera::A => &self.a,
            Camera::B => &self.b,
        }
    }

    pub fn sample(&self, camera: Camera, x: i64, y: i64) -> f32 {
        self.frame(camera).sample(x, y)
    }
}
