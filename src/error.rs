use thiserror::Error;

use crate::types::Camera;

/// Structural failures that abort a registration pass.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Centroids or transforms were requested before any correspondence was accepted.
    #[error("no correspondences were accepted, nothing to register")]
    EmptyCorrespondenceSet,

    #[error("depth frame for camera {camera} is {actual_w}x{actual_h}, expected {expected_w}x{expected_h}")]
    FrameSizeMismatch {
        camera: Camera,
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },

    #[error("depth frame buffer holds {actual} samples, expected {expected}")]
    FrameBufferSize { expected: usize, actual: usize },

    /// A transform was requested from a session that has not been solved yet.
    #[error("registration has not been solved yet")]
    NotSolved,

    #[error("singular value decomposition did not produce U and V^T")]
    SvdFailed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Data-quality problems that are recovered locally.
///
/// These never abort a pass, they are logged and attached to the result that
/// produced them so an operator can judge how far to trust the transform.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum DataQualityIssue {
    /// No valid depth in the 3x3 neighborhood of a correspondence point,
    /// the sentinel value was used in its place.
    DegenerateDepth { index: usize, camera: Camera },
    /// The cross-covariance matrix has fewer than three non-zero singular values.
    RankDeficientCovariance { rank: usize },
}

impl std::fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataQualityIssue::DegenerateDepth { index, camera } => write!(
                f,
                "correspondence {} has no valid depth near its camera {} point",
                index, camera
            ),
            DataQualityIssue::RankDeficientCovariance { rank } => {
                write!(f, "cross-covariance matrix has rank {} < 3", rank)
            }
        }
    }
}
