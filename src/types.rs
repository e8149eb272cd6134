use serde::{Deserialize, Serialize};

/// Pixel coordinate `(u, v)` in one camera's image plane.
pub type PixelPoint = glam::Vec2;

/// `(x, y, z)` in pixel and raw depth units.
pub type Point3D = glam::Vec3;

/// Which of the two depth cameras a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Camera {
    A,
    B,
}

impl Camera {
    pub fn index(&self) -> usize {
        match self {
            Camera::A => 0,
            Camera::B => 1,
        }
    }
}

impl std::fmt::Display for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Camera::A => write!(f, "A"),
            Camera::B => write!(f, "B"),
        }
    }
}

/// The same physical point as seen by camera A and camera B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    pub point_a: PixelPoint,
    pub point_b: PixelPoint,
}

impl Correspondence {
    pub fn new(point_a: PixelPoint, point_b: PixelPoint) -> Correspondence {
        Correspondence { point_a, point_b }
    }

    pub fn point(&self, camera: Camera) -> PixelPoint {
        match camera {
            Camera::A => self.point_a,
            Camera::B => self.point_b,
        }
    }
}

/// Mean backprojected position of the correspondence set, per camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub a: Point3D,
    pub b: Point3D,
}

impl Centroid {
    pub fn get(&self, camera: Camera) -> Point3D {
        match camera {
            Camera::A => self.a,
            Camera::B => self.b,
        }
    }
}
