use crate::correspondence::CorrespondenceSet;
use crate::depth::{FramePair, is_sentinel};
use crate::error::{DataQualityIssue, RegistrationError, RegistrationResult};
use crate::types::{Camera, Centroid, Point3D};

/// A correspondence lifted to `(u, v, depth)` in both cameras.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackprojectedPair {
    pub a: Point3D,
    pub b: Point3D,
}

/// Samples depth under every correspondence point.
///
/// Points whose whole neighborhood is invalid keep the sentinel depth and are
/// reported as `DegenerateDepth`.
pub fn backproject(
    set: &CorrespondenceSet,
    frames: &FramePair,
) -> (Vec<BackprojectedPair>, Vec<DataQualityIssue>) {
    let mut issues = Vec::new();
    let pairs = set
        .iter()
        .enumerate()
        .map(|(index, c)| {
            let mut lift = |camera: Camera| {
                let p = c.point(camera);
                let d = frames.sample(camera, p.x as i64, p.y as i64);
                if is_sentinel(d) {
                    log::warn!(
                        "no valid depth near ({}, {}) in camera {}, using sentinel",
                        p.x,
                        p.y,
                        camera
                    );
                    issues.push(DataQualityIssue::DegenerateDepth { index, camera });
                }
                Point3D::new(p.x, p.y, d)
            };
            let a = lift(Camera::A);
            let b = lift(Camera::B);
            log::debug!("first {}: {:?}, second {}: {:?}", index, a, index, b);
            BackprojectedPair { a, b }
        })
        .collect();
    (pairs, issues)
}

/// Mean of backprojected points per camera.
pub fn centroid_of(pairs: &[BackprojectedPair]) -> RegistrationResult<Centroid> {
    if pairs.is_empty() {
        return Err(RegistrationError::EmptyCorrespondenceSet);
    }
    let (sum_a, sum_b) = pairs
        .iter()
        .fold((Point3D::ZERO, Point3D::ZERO), |(sa, sb), p| (sa + p.a, sb + p.b));
    let n = pairs.len() as f32;
    Ok(Centroid {
        a: sum_a / n,
        b: sum_b / n,
    })
}

/// Centroid of each camera's correspondence cloud.
pub fn compute_centroids(
    set: &CorrespondenceSet,
    frames: &FramePair,
) -> RegistrationResult<(Centroid, Vec<DataQualityIssue>)> {
    if set.is_empty() {
        return Err(RegistrationError::EmptyCorrespondenceSet);
    }
    let (pairs, issues) = backproject(set, frames);
    let centroid = centroid_of(&pairs)?;
    log::info!("centroid A (x,y,z) = {:?}", centroid.a);
    log::info!("centroid B (x,y,z) = {:?}", centroid.b);
    Ok((centroid, issues))
}
