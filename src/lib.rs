//! Registration of two depth camera point clouds from operator-vetted pixel
//! correspondences.
//!
//! A pass goes through [`vetting`] (accept/reject candidate matches),
//! [`centroid`] (backproject and average per camera) and [`solver`]
//! (Kabsch rotation and centroid translation), usually driven by a
//! [`session::RegistrationSession`].

pub mod centroid;
pub mod cloud;
pub mod config;
pub mod correspondence;
pub mod depth;
pub mod error;
pub mod io;
pub mod session;
pub mod solver;
pub mod transform;
pub mod types;
pub mod vetting;

pub use config::RegistrationConfig;
pub use correspondence::CorrespondenceSet;
pub use depth::{DepthFrame, FramePair};
pub use error::{DataQualityIssue, RegistrationError, RegistrationResult};
pub use session::RegistrationSession;
pub use transform::{RigidTransform, TransformMode, TransformSet};
pub use types::{Camera, Centroid, Correspondence, PixelPoint, Point3D};
