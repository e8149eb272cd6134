use serde::{Deserialize, Serialize};

use crate::depth::DEPTH_SENTINEL;
use crate::types::Point3D;

/// Fixed projection of the depth camera, from raw `(u, v, disparity)` to meters.
///
/// The depth conversion is `z = 1 / (a * raw + b)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub a: f32,
    pub b: f32,
}

impl Default for DepthIntrinsics {
    fn default() -> Self {
        Self {
            fx: 594.21,
            fy: 591.04,
            cx: 339.5,
            cy: 242.7,
            a: -0.0030711,
            b: 3.3309495,
        }
    }
}

impl DepthIntrinsics {
    /// Metric camera-frame point, y up and looking down -z.
    ///
    /// Returns `None` for the sentinel or for raw values at or beyond the
    /// projection's far plane.
    pub fn to_metric(&self, u: f32, v: f32, raw: f32) -> Option<Point3D> {
        if raw >= DEPTH_SENTINEL as f32 {
            return None;
        }
        let w = self.a * raw + self.b;
        if w <= 0.0 {
            return None;
        }
        let x = (u - self.cx) / self.fx;
        let y = (self.cy - v) / self.fy;
        Some(Point3D::new(x / w, y / w, -1.0 / w))
    }
}

/// Everything a registration pass needs to know besides its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub image_width: usize,
    pub image_height: usize,
    /// Normalization constant for raw depth.
    pub max_depth: f32,
    /// Largest allowed deviation from the running average slope.
    pub slope_tolerance: f64,
    /// Apply the determinant correction so the solved rotation is always proper.
    pub correct_reflection: bool,
    pub intrinsics: DepthIntrinsics,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            image_width: 640,
            image_height: 480,
            max_depth: 2048.0,
            slope_tolerance: 0.05,
            correct_reflection: false,
            intrinsics: DepthIntrinsics::default(),
        }
    }
}

impl RegistrationConfig {
    /// Per-axis normalization constants `(width, height, max depth)`.
    pub fn normalization(&self) -> nalgebra::Vector3<f64> {
        nalgebra::Vector3::new(
            self.image_width as f64,
            self.image_height as f64,
            self.max_depth as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RegistrationConfig =
            serde_json::from_str(r#"{"slope_tolerance": 0.1, "intrinsics": {"fx": 500.0}}"#)
                .unwrap();
        assert_eq!(config.slope_tolerance, 0.1);
        assert_eq!(config.image_width, 640);
        assert_eq!(config.intrinsics.fx, 500.0);
        assert_eq!(config.intrinsics.fy, 591.04);
    }

    #[test]
    fn sentinel_has_no_metric_point() {
        let k = DepthIntrinsics::default();
        assert!(k.to_metric(320.0, 240.0, 2047.0).is_none());
        let p = k.to_metric(k.cx, k.cy, 800.0).unwrap();
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
        // roughly 1.14 m for a raw reading of 800
        assert!((p.z + 1.14).abs() < 0.01);
    }
}
