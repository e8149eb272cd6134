use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::config::RegistrationConfig;
use crate::correspondence::CorrespondenceSet;
use crate::types::{Correspondence, PixelPoint};

/// A match proposed by the feature matcher, waiting for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub point_a: PixelPoint,
    pub point_b: PixelPoint,
    /// Descriptor distance reported by the matcher, informational only.
    #[serde(default)]
    pub distance: f32,
}

impl Candidate {
    pub fn new(point_a: PixelPoint, point_b: PixelPoint) -> Candidate {
        Candidate {
            point_a,
            point_b,
            distance: 0.0,
        }
    }

    pub fn correspondence(&self) -> Correspondence {
        Correspondence::new(self.point_a, self.point_b)
    }

    /// Slope of the segment joining both points when the two images are placed
    /// side by side, B to the right of A, with y pointing up.
    pub fn joined_slope(&self, image_width: usize, image_height: usize) -> f64 {
        let w = image_width as f64;
        let h = image_height as f64;
        let (x1, y1) = (self.point_a.x as f64, h - self.point_a.y as f64);
        let (x2, y2) = (self.point_b.x as f64 + w, h - self.point_b.y as f64);
        (y2 - y1) / (x2 - x1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    Stop,
}

/// Where accept/reject decisions come from.
///
/// The session calls `await_decision` once per candidate that survives the
/// filters and does not continue until it returns.
pub trait DecisionSource {
    fn await_decision(&mut self, candidate: &Candidate, accepted: &CorrespondenceSet) -> Decision;

    /// Called for every candidate the filters reject before it reaches the operator.
    fn notify_auto_rejected(&mut self, _candidate: &Candidate, _reason: &AutoRejectReason) {}
}

/// Replays a fixed list of decisions, then stops.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    decisions: std::collections::VecDeque<Decision>,
    prompts: usize,
}

impl ScriptedDecisions {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> ScriptedDecisions {
        ScriptedDecisions {
            decisions: decisions.into_iter().collect(),
            prompts: 0,
        }
    }

    /// How many times the session asked for a decision.
    pub fn prompts(&self) -> usize {
        self.prompts
    }
}

impl DecisionSource for ScriptedDecisions {
    fn await_decision(&mut self, _: &Candidate, _: &CorrespondenceSet) -> Decision {
        self.prompts += 1;
        self.decisions.pop_front().unwrap_or(Decision::Stop)
    }
}

/// Accepts every candidate that reaches it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl DecisionSource for AcceptAll {
    fn await_decision(&mut self, _: &Candidate, _: &CorrespondenceSet) -> Decision {
        Decision::Accept
    }
}

/// Line-based operator prompt: `y` accepts, `q` stops, anything else rejects.
pub struct TerminalDecisions<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalDecisions<R, W> {
    pub fn new(input: R, output: W) -> TerminalDecisions<R, W> {
        TerminalDecisions { input, output }
    }
}

impl<R: BufRead, W: Write> DecisionSource for TerminalDecisions<R, W> {
    fn await_decision(&mut self, candidate: &Candidate, accepted: &CorrespondenceSet) -> Decision {
        let prompt = writeln!(
            self.output,
            "candidate A ({:.1}, {:.1}) <-> B ({:.1}, {:.1}), {} accepted so far. accept? [y/n/q]",
            candidate.point_a.x,
            candidate.point_a.y,
            candidate.point_b.x,
            candidate.point_b.y,
            accepted.len()
        )
        .and_then(|_| self.output.flush());
        if let Err(e) = prompt {
            log::warn!("cannot write prompt: {}", e);
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                log::warn!("decision input closed, stopping");
                Decision::Stop
            }
            Ok(_) => match line.trim() {
                "y" | "Y" => Decision::Accept,
                "q" | "Q" => Decision::Stop,
                _ => Decision::Reject,
            },
            Err(e) => {
                log::warn!("cannot read decision: {}, stopping", e);
                Decision::Stop
            }
        }
    }

    fn notify_auto_rejected(&mut self, candidate: &Candidate, reason: &AutoRejectReason) {
        if let Err(e) = writeln!(
            self.output,
            "candidate A ({:.1}, {:.1}) <-> B ({:.1}, {:.1}) skipped: {}",
            candidate.point_a.x, candidate.point_a.y, candidate.point_b.x, candidate.point_b.y, reason
        ) {
            log::warn!("cannot write auto-rejection: {}", e);
        }
    }
}

/// Why a candidate was rejected without asking the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AutoRejectReason {
    /// The joined-image slope is too far from the running average.
    SlopeOutOfRange { slope: f64, average: f64 },
    /// One of its points already belongs to an accepted correspondence.
    PointReuse,
}

impl std::fmt::Display for AutoRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutoRejectReason::SlopeOutOfRange { slope, average } => write!(
                f,
                "invalid slope {:.4}, |slope - average| = {:.4}",
                slope,
                (slope - average).abs()
            ),
            AutoRejectReason::PointReuse => {
                write!(f, "point already used by an accepted correspondence")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CandidateOutcome {
    Accepted { slope: f64 },
    Rejected,
    AutoRejected(AutoRejectReason),
}

/// Result of one vetting pass.
#[derive(Debug, Clone, Default)]
pub struct VettingReport {
    pub correspondences: CorrespondenceSet,
    /// One entry per candidate examined, in candidate order.
    pub outcomes: Vec<CandidateOutcome>,
    /// The operator ended the pass before the candidate list was exhausted.
    pub stopped: bool,
}

impl VettingReport {
    pub fn accepted(&self) -> usize {
        self.correspondences.len()
    }

    pub fn auto_rejected(&self) -> impl Iterator<Item = (usize, &AutoRejectReason)> {
        self.outcomes.iter().enumerate().filter_map(|(i, o)| match o {
            CandidateOutcome::AutoRejected(reason) => Some((i, reason)),
            _ => None,
        })
    }
}

/// Drives accept/reject over a candidate list with the slope and reuse filters.
#[derive(Debug, Clone)]
pub struct VettingSession {
    image_width: usize,
    image_height: usize,
    slope_tolerance: f64,
    accepted: CorrespondenceSet,
    total_slope: f64,
}

impl VettingSession {
    pub fn new(config: &RegistrationConfig) -> VettingSession {
        VettingSession {
            image_width: config.image_width,
            image_height: config.image_height,
            slope_tolerance: config.slope_tolerance,
            accepted: CorrespondenceSet::new(),
            total_slope: 0.0,
        }
    }

    pub fn accepted(&self) -> &CorrespondenceSet {
        &self.accepted
    }

    /// Mean slope of the accepted correspondences, `None` before the first one.
    pub fn average_slope(&self) -> Option<f64> {
        if self.accepted.is_empty() {
            None
        } else {
            Some(self.total_slope / self.accepted.len() as f64)
        }
    }

    /// Filters applied before prompting. The first candidate is never filtered.
    pub fn screen(&self, candidate: &Candidate) -> Option<AutoRejectReason> {
        let average = self.average_slope()?;
        let slope = candidate.joined_slope(self.image_width, self.image_height);
        // written so that a NaN slope is rejected too
        if !((slope - average).abs() <= self.slope_tolerance) {
            return Some(AutoRejectReason::SlopeOutOfRange { slope, average });
        }
        if self.accepted.conflicts_with(&candidate.correspondence()) {
            return Some(AutoRejectReason::PointReuse);
        }
        None
    }

    fn accept(&mut self, candidate: &Candidate) -> f64 {
        let slope = candidate.joined_slope(self.image_width, self.image_height);
        self.accepted.push(candidate.correspondence());
        self.total_slope += slope;
        slope
    }

    /// Vets `candidates` in order until the list runs out or the operator stops.
    pub fn run<D: DecisionSource + ?Sized>(
        mut self,
        candidates: &[Candidate],
        decisions: &mut D,
    ) -> VettingReport {
        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut stopped = false;

        for (i, candidate) in candidates.iter().enumerate() {
            if let Some(reason) = self.screen(candidate) {
                log::info!("candidate {} auto-rejected: {}", i, reason);
                decisions.notify_auto_rejected(candidate, &reason);
                outcomes.push(CandidateOutcome::AutoRejected(reason));
                continue;
            }
            match decisions.await_decision(candidate, &self.accepted) {
                Decision::Accept => {
                    let slope = self.accept(candidate);
                    log::info!(
                        "candidate {} accepted: ({}, {}) <-> ({}, {}), slope {:.4}",
                        i,
                        candidate.point_a.x,
                        candidate.point_a.y,
                        candidate.point_b.x,
                        candidate.point_b.y,
                        slope
                    );
                    outcomes.push(CandidateOutcome::Accepted { slope });
                }
                Decision::Reject => {
                    log::info!("candidate {} denied", i);
                    outcomes.push(CandidateOutcome::Rejected);
                }
                Decision::Stop => {
                    log::info!("vetting stopped by operator at candidate {}", i);
                    stopped = true;
                    break;
                }
            }
        }

        log::info!(
            "vetting finished with {} correspondences out of {} candidates",
            self.accepted.len(),
            candidates.len()
        );
        VettingReport {
            correspondences: self.accepted,
            outcomes,
            stopped,
        }
    }
}
