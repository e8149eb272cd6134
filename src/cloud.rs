use nalgebra as na;
use rayon::prelude::*;

use crate::config::RegistrationConfig;
use crate::depth::{DEPTH_MASK, DEPTH_SENTINEL, DepthFrame};
use crate::transform::RigidTransform;
use crate::types::Point3D;

/// Which coordinates a cloud is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CloudUnits {
    /// `(x / width, y / height, depth / max_depth)`, the frame the solver works in.
    #[default]
    Normalized,
    /// Meters, through the depth camera intrinsics.
    Metric,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point3D>,
}

impl PointCloud {
    /// One point per pixel with a valid depth sample.
    pub fn from_depth_frame(
        frame: &DepthFrame,
        config: &RegistrationConfig,
        units: CloudUnits,
    ) -> PointCloud {
        let width = frame.width();
        if width == 0 {
            return PointCloud::default();
        }
        let w = config.image_width as f32;
        let h = config.image_height as f32;
        let points = frame
            .raw()
            .par_chunks(width)
            .enumerate()
            .flat_map_iter(|(v, row)| {
                row.iter().enumerate().filter_map(move |(u, raw)| {
                    let d = raw & DEPTH_MASK;
                    if d == DEPTH_SENTINEL {
                        return None;
                    }
                    let (u, v, d) = (u as f32, v as f32, d as f32);
                    match units {
                        CloudUnits::Normalized => {
                            Some(Point3D::new(u / w, v / h, d / config.max_depth))
                        }
                        CloudUnits::Metric => config.intrinsics.to_metric(u, v, d),
                    }
                })
            })
            .collect();
        PointCloud { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn transformed(&self, transform: &RigidTransform) -> PointCloud {
        let points = self
            .points
            .par_iter()
            .map(|p| {
                let q = transform.transform_point(&na::Point3::new(p.x as f64, p.y as f64, p.z as f64));
                Point3D::new(q.x as f32, q.y as f32, q.z as f32)
            })
            .collect();
        PointCloud { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_pixels_are_dropped() {
        let mut frame = DepthFrame::filled(4, 2, 1024);
        frame.set_raw(3, 1, DEPTH_SENTINEL);
        let config = RegistrationConfig {
            image_width: 4,
            image_height: 2,
            ..Default::default()
        };
        let cloud = PointCloud::from_depth_frame(&frame, &config, CloudUnits::Normalized);
        assert_eq!(cloud.len(), 7);
        assert_eq!(cloud.points[5], Point3D::new(0.25, 0.5, 0.5));
    }
}
