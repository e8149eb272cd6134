use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::cloud::PointCloud;
use crate::depth::DepthFrame;
use crate::error::{RegistrationError, RegistrationResult};
use crate::session::RegistrationSession;
use crate::solver::SolveDiagnostics;
use crate::transform::{RigidTransform, TransformMode, TransformSet};
use crate::types::{Centroid, Correspondence};
use crate::vetting::{Candidate, VettingReport};

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize, P: AsRef<Path>>(output_path: P, object: &T) -> RegistrationResult<()> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned, P: AsRef<Path>>(file_path: P) -> RegistrationResult<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Candidate matches as written by the feature matcher, best first.
pub fn load_candidates<P: AsRef<Path>>(file_path: P) -> RegistrationResult<Vec<Candidate>> {
    object_from_json(file_path)
}

/// Reads a raw depth frame stored as a 16-bit grayscale image.
pub fn load_depth_frame<P: AsRef<Path>>(path: P) -> RegistrationResult<DepthFrame> {
    let img = image::ImageReader::open(path)?.decode()?.to_luma16();
    let (w, h) = img.dimensions();
    DepthFrame::new(w as usize, h as usize, img.into_raw())
}

pub fn save_depth_frame<P: AsRef<Path>>(path: P, frame: &DepthFrame) -> RegistrationResult<()> {
    let buffer = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.raw().to_vec(),
    )
    .ok_or(RegistrationError::FrameBufferSize {
        expected: frame.width() * frame.height(),
        actual: frame.raw().len(),
    })?;
    buffer.save(path)?;
    Ok(())
}

/// ASCII PLY with vertex positions only.
pub fn write_ply<P: AsRef<Path>>(output_path: P, cloud: &PointCloud) -> RegistrationResult<()> {
    let mut file = BufWriter::new(std::fs::File::create(output_path)?);
    writeln!(file, "ply")?;
    writeln!(file, "format ascii 1.0")?;
    writeln!(file, "element vertex {}", cloud.len())?;
    writeln!(file, "property float x")?;
    writeln!(file, "property float y")?;
    writeln!(file, "property float z")?;
    writeln!(file, "end_header")?;
    for p in &cloud.points {
        writeln!(file, "{} {} {}", p.x, p.y, p.z)?;
    }
    file.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct VettingSummary {
    candidates_examined: usize,
    accepted: usize,
    denied: usize,
    auto_rejected_slope: usize,
    auto_rejected_reuse: usize,
    stopped: bool,
}

#[derive(serde::Serialize)]
struct RegistrationReport<'a> {
    timestamp: String,
    correspondences: &'a [Correspondence],
    centroid: Option<&'a Centroid>,
    transforms: Option<&'a TransformSet>,
    diagnostics: Option<&'a SolveDiagnostics>,
    mode: TransformMode,
    published: RigidTransform,
    vetting: Option<VettingSummary>,
}

fn summarize(report: &VettingReport) -> VettingSummary {
    use crate::vetting::{AutoRejectReason, CandidateOutcome};
    let outcomes = &report.outcomes;
    VettingSummary {
        candidates_examined: outcomes.len(),
        accepted: report.accepted(),
        denied: outcomes
            .iter()
            .filter(|o| matches!(o, CandidateOutcome::Rejected))
            .count(),
        auto_rejected_slope: outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    CandidateOutcome::AutoRejected(AutoRejectReason::SlopeOutOfRange { .. })
                )
            })
            .count(),
        auto_rejected_reuse: outcomes
            .iter()
            .filter(|o| matches!(o, CandidateOutcome::AutoRejected(AutoRejectReason::PointReuse)))
            .count(),
        stopped: report.stopped,
    }
}

fn local_timestamp() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    now.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Writes everything a session produced to a JSON report.
pub fn write_registration_report<P: AsRef<Path>>(
    output_path: P,
    session: &RegistrationSession,
    vetting: Option<&VettingReport>,
) -> RegistrationResult<()> {
    let solution = session.solution();
    let report = RegistrationReport {
        timestamp: local_timestamp(),
        correspondences: session.correspondences().as_slice(),
        centroid: session.centroid(),
        transforms: solution.map(|s| &s.transforms),
        diagnostics: solution.map(|s| &s.diagnostics),
        mode: session.mode(),
        published: session.published_transform(),
        vetting: vetting.map(summarize),
    };
    object_to_json(output_path, &report)
}
