use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 4x4 homogeneous rigid transform with bottom row `[0, 0, 0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    matrix: na::Matrix4<f64>,
}

impl RigidTransform {
    pub fn identity() -> RigidTransform {
        RigidTransform {
            matrix: na::Matrix4::identity(),
        }
    }

    pub fn from_parts(rotation: &na::Matrix3<f64>, translation: &na::Vector3<f64>) -> RigidTransform {
        let mut matrix = na::Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        RigidTransform { matrix }
    }

    pub fn rotation_only(rotation: &na::Matrix3<f64>) -> RigidTransform {
        Self::from_parts(rotation, &na::Vector3::zeros())
    }

    pub fn translation_only(translation: &na::Vector3<f64>) -> RigidTransform {
        Self::from_parts(&na::Matrix3::identity(), translation)
    }

    /// Hand-tuned small rotation about z kept from early calibration experiments.
    pub fn experimental() -> RigidTransform {
        let rotation = na::Matrix3::new(
            0.997846, 0.065586, 0.000845, //
            -0.065586, 0.997847, 0.000038, //
            -0.000841, -0.000093, 1.000000,
        );
        Self::rotation_only(&rotation)
    }

    pub fn matrix(&self) -> &na::Matrix4<f64> {
        &self.matrix
    }

    pub fn rotation(&self) -> na::Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn translation(&self) -> na::Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn transform_point(&self, p: &na::Point3<f64>) -> na::Point3<f64> {
        self.matrix.transform_point(p)
    }

    /// Row-major copy, the layout renderers expecting transposed uploads want.
    pub fn to_row_major(&self) -> [[f64; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.matrix[(r, c)];
            }
        }
        out
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Serialize for RigidTransform {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_row_major().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RigidTransform {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = <[[f64; 4]; 4]>::deserialize(deserializer)?;
        if rows[3] != [0.0, 0.0, 0.0, 1.0] {
            return Err(serde::de::Error::custom(format!(
                "bottom row of a rigid transform must be [0, 0, 0, 1], got {:?}",
                rows[3]
            )));
        }
        let matrix = na::Matrix4::from_fn(|r, c| rows[r][c]);
        Ok(RigidTransform { matrix })
    }
}

/// Which transform the renderer applies to camera A's cloud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    #[default]
    None,
    Rotation,
    Translation,
    Full,
    Experimental,
}

/// The three transforms produced by one solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSet {
    pub rotation_only: RigidTransform,
    pub translation_only: RigidTransform,
    pub full: RigidTransform,
}

impl TransformSet {
    pub fn new(rotation: &na::Matrix3<f64>, translation: &na::Vector3<f64>) -> TransformSet {
        TransformSet {
            rotation_only: RigidTransform::rotation_only(rotation),
            translation_only: RigidTransform::translation_only(translation),
            full: RigidTransform::from_parts(rotation, translation),
        }
    }

    pub fn select(&self, mode: TransformMode) -> RigidTransform {
        match mode {
            TransformMode::None => RigidTransform::identity(),
            TransformMode::Rotation => self.rotation_only,
            TransformMode::Translation => self.translation_only,
            TransformMode::Full => self.full,
            TransformMode::Experimental => RigidTransform::experimental(),
        }
    }
}
