use crate::centroid::compute_centroids;
use crate::config::RegistrationConfig;
use crate::correspondence::CorrespondenceSet;
use crate::depth::FramePair;
use crate::error::{DataQualityIssue, RegistrationError, RegistrationResult};
use crate::solver::{Solution, solve};
use crate::transform::{RigidTransform, TransformMode};
use crate::types::Centroid;
use crate::vetting::{Candidate, DecisionSource, VettingReport, VettingSession};

/// State of one calibration run: vet, compute centroids, solve, publish.
#[derive(Debug, Clone)]
pub struct RegistrationSession {
    config: RegistrationConfig,
    correspondences: CorrespondenceSet,
    centroid: Option<Centroid>,
    centroid_issues: Vec<DataQualityIssue>,
    solution: Option<Solution>,
    mode: TransformMode,
}

impl RegistrationSession {
    pub fn new(config: RegistrationConfig) -> RegistrationSession {
        RegistrationSession {
            config,
            correspondences: CorrespondenceSet::new(),
            centroid: None,
            centroid_issues: Vec::new(),
            solution: None,
            mode: TransformMode::None,
        }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    pub fn correspondences(&self) -> &CorrespondenceSet {
        &self.correspondences
    }

    pub fn centroid(&self) -> Option<&Centroid> {
        self.centroid.as_ref()
    }

    /// Degenerate depth readings met while computing the centroids.
    pub fn centroid_issues(&self) -> &[DataQualityIssue] {
        &self.centroid_issues
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        log::info!("transform mode {:?}", mode);
        self.mode = mode;
    }

    /// Runs a fresh vetting pass, dropping any earlier correspondences and results.
    pub fn vet<D: DecisionSource + ?Sized>(
        &mut self,
        candidates: &[Candidate],
        decisions: &mut D,
    ) -> VettingReport {
        self.correspondences.clear();
        self.centroid = None;
        self.centroid_issues.clear();
        self.solution = None;
        let report = VettingSession::new(&self.config).run(candidates, decisions);
        self.correspondences = report.correspondences.clone();
        report
    }

    pub fn compute_centroids(&mut self, frames: &FramePair) -> RegistrationResult<&Centroid> {
        let (centroid, issues) = compute_centroids(&self.correspondences, frames)?;
        self.centroid_issues = issues;
        self.solution = None;
        Ok(self.centroid.insert(centroid))
    }

    /// Solves with the centroids already computed, computing them first if needed.
    pub fn solve(&mut self, frames: &FramePair) -> RegistrationResult<&Solution> {
        let centroid = match self.centroid {
            Some(c) => c,
            None => *self.compute_centroids(frames)?,
        };
        let solution = solve(&centroid, &self.correspondences, frames, &self.config)?;
        Ok(self.solution.insert(solution))
    }

    /// Vet, compute centroids and solve in one go, then publish the full transform.
    pub fn register<D: DecisionSource + ?Sized>(
        &mut self,
        frames: &FramePair,
        candidates: &[Candidate],
        decisions: &mut D,
    ) -> RegistrationResult<VettingReport> {
        let report = self.vet(candidates, decisions);
        if self.correspondences.is_empty() {
            return Err(RegistrationError::EmptyCorrespondenceSet);
        }
        self.compute_centroids(frames)?;
        self.solve(frames)?;
        self.set_mode(TransformMode::Full);
        Ok(report)
    }

    /// Transform for the current mode, identity until a solve completes.
    pub fn published_transform(&self) -> RigidTransform {
        match (self.mode, &self.solution) {
            (TransformMode::Experimental, _) => RigidTransform::experimental(),
            (mode, Some(solution)) => solution.transforms.select(mode),
            (_, None) => RigidTransform::identity(),
        }
    }

    /// Like [`published_transform`](Self::published_transform) but errors before a solve.
    pub fn require_transform(&self, mode: TransformMode) -> RegistrationResult<RigidTransform> {
        match (mode, &self.solution) {
            (TransformMode::None, _) => Ok(RigidTransform::identity()),
            (TransformMode::Experimental, _) => Ok(RigidTransform::experimental()),
            (mode, Some(solution)) => Ok(solution.transforms.select(mode)),
            (_, None) => Err(RegistrationError::NotSolved),
        }
    }
}
