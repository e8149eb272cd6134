//! Rigid alignment of the two correspondence clouds (Kabsch / orthogonal Procrustes).
//!
//! Coordinates are normalized per axis, pixels by the image size and depth by
//! its maximum range, they are never converted to metric units.
//!
//! Known limitations:
//! * without `correct_reflection` the rotation may be improper (`det = -1`)
//!   when the best alignment needs a reflection.
//! * `M = P * Q^T` decomposed as `U S V^T` gives `R = U V^T`, which rotates
//!   B's centered cloud onto A's, while the translation points from A to B.
//! * rank deficient `M` (colinear or too few points) leaves `U` and `V`
//!   partially arbitrary. The result is still returned, flagged in
//!   [`SolveDiagnostics`].

use nalgebra as na;
use serde::Serialize;

use crate::centroid::{BackprojectedPair, backproject};
use crate::config::RegistrationConfig;
use crate::correspondence::CorrespondenceSet;
use crate::depth::FramePair;
use crate::error::{DataQualityIssue, RegistrationError, RegistrationResult};
use crate::transform::TransformSet;
use crate::types::{Centroid, Point3D};

/// Relative threshold under which a singular value counts as zero.
const RANK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveDiagnostics {
    /// Singular values of the cross-covariance matrix, largest first.
    pub singular_values: [f64; 3],
    pub rank: usize,
    pub rank_deficient: bool,
    pub rotation_determinant: f64,
    pub reflection_corrected: bool,
    pub issues: Vec<DataQualityIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub rotation: na::Matrix3<f64>,
    /// Normalized centroid difference, B minus A.
    pub translation: na::Vector3<f64>,
    pub centroid: Centroid,
    pub normalization: na::Vector3<f64>,
    pub transforms: TransformSet,
    pub diagnostics: SolveDiagnostics,
}

impl Solution {
    /// Maps a raw camera A point: rotate about A's centroid, then translate.
    pub fn map_point(&self, p: &Point3D) -> Point3D {
        let pn = normalize(p, &self.normalization);
        let ca = normalize(&self.centroid.a, &self.normalization);
        let mapped = self.rotation * (pn - ca) + ca + self.translation;
        let raw = mapped.component_mul(&self.normalization);
        Point3D::new(raw.x as f32, raw.y as f32, raw.z as f32)
    }
}

fn normalize(p: &Point3D, normalization: &na::Vector3<f64>) -> na::Vector3<f64> {
    na::Vector3::new(p.x as f64, p.y as f64, p.z as f64).component_div(normalization)
}

/// Solves for the rotation and translation between the two clouds.
///
/// Depth is re-sampled from `frames` for every correspondence.
pub fn solve(
    centroid: &Centroid,
    set: &CorrespondenceSet,
    frames: &FramePair,
    config: &RegistrationConfig,
) -> RegistrationResult<Solution> {
    if set.is_empty() {
        return Err(RegistrationError::EmptyCorrespondenceSet);
    }
    let (pairs, issues) = backproject(set, frames);
    let mut solution = solve_pairs(centroid, &pairs, config)?;
    solution.diagnostics.issues.splice(0..0, issues);
    Ok(solution)
}

/// Same as [`solve`] on already backprojected correspondences.
pub fn solve_pairs(
    centroid: &Centroid,
    pairs: &[BackprojectedPair],
    config: &RegistrationConfig,
) -> RegistrationResult<Solution> {
    if pairs.is_empty() {
        return Err(RegistrationError::EmptyCorrespondenceSet);
    }
    let norm = config.normalization();
    let ca = normalize(&centroid.a, &norm);
    let cb = normalize(&centroid.b, &norm);

    let p_cols: Vec<_> = pairs.iter().map(|p| normalize(&p.a, &norm) - ca).collect();
    let q_cols: Vec<_> = pairs.iter().map(|p| normalize(&p.b, &norm) - cb).collect();
    let p = na::Matrix3xX::from_columns(&p_cols);
    let q = na::Matrix3xX::from_columns(&q_cols);
    log::debug!("P: {}", p);
    log::debug!("Q: {}", q);

    let m: na::Matrix3<f64> = &p * q.transpose();
    log::debug!("PQt: {}", m);

    let svd = m.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(RegistrationError::SvdFailed)?;
    let sv = svd.singular_values;
    log::debug!("U: {}", u);
    log::debug!("Vt: {}", v_t);

    let largest = sv.max();
    let rank = sv.iter().filter(|s| **s > largest * RANK_EPSILON).count();
    let mut issues = Vec::new();
    if rank < 3 {
        log::warn!("cross-covariance is rank {}, rotation is not unique", rank);
        issues.push(DataQualityIssue::RankDeficientCovariance { rank });
    }

    let mut rotation = u * v_t;
    let mut reflection_corrected = false;
    if config.correct_reflection && rotation.determinant() < 0.0 {
        // flip the axis of the smallest singular value
        let mut flip = na::Vector3::repeat(1.0);
        flip[sv.imin()] = -1.0;
        rotation = u * na::Matrix3::from_diagonal(&flip) * v_t;
        reflection_corrected = true;
    }
    let rotation_determinant = rotation.determinant();
    if rotation_determinant < 0.0 {
        log::warn!("solved rotation is a reflection, det = {:.4}", rotation_determinant);
    }
    log::debug!("r: {}", rotation);

    let translation = cb - ca;
    let transforms = TransformSet::new(&rotation, &translation);
    log::info!("rottrans: {}", transforms.full.matrix());

    let mut sorted = [sv[0], sv[1], sv[2]];
    sorted.sort_by(|a, b| b.total_cmp(a));

    Ok(Solution {
        rotation,
        translation,
        centroid: *centroid,
        normalization: norm,
        transforms,
        diagnostics: SolveDiagnostics {
            singular_values: sorted,
            rank,
            rank_deficient: rank < 3,
            rotation_determinant,
            reflection_corrected,
            issues,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: [f32; 3], b: [f32; 3]) -> BackprojectedPair {
        BackprojectedPair {
            a: Point3D::from_array(a),
            b: Point3D::from_array(b),
        }
    }

    #[test]
    fn mirrored_cloud_needs_reflection_flag() {
        // B is A mirrored in z, the plain solve returns a reflection
        let a = [[0.0, 0.0, 0.0], [640.0, 0.0, 0.0], [0.0, 480.0, 0.0], [0.0, 0.0, 2048.0]];
        let pairs: Vec<_> = a.iter().map(|p| pair(*p, [p[0], p[1], -p[2]])).collect();
        let centroid = crate::centroid::centroid_of(&pairs).unwrap();

        let plain = solve_pairs(&centroid, &pairs, &RegistrationConfig::default()).unwrap();
        assert!(plain.diagnostics.rotation_determinant < 0.0);
        assert!(!plain.diagnostics.reflection_corrected);

        let config = RegistrationConfig {
            correct_reflection: true,
            ..Default::default()
        };
        let fixed = solve_pairs(&centroid, &pairs, &config).unwrap();
        assert!((fixed.diagnostics.rotation_determinant - 1.0).abs() < 1e-9);
        assert!(fixed.diagnostics.reflection_corrected);
    }
}
