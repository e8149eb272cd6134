use serde::{Deserialize, Serialize};

use crate::types::{Correspondence, PixelPoint};

/// Accepted correspondences in the order they were accepted.
///
/// Each image point appears in at most one correspondence per camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceSet {
    correspondences: Vec<Correspondence>,
}

impl CorrespondenceSet {
    pub fn new() -> CorrespondenceSet {
        CorrespondenceSet::default()
    }

    pub fn push(&mut self, correspondence: Correspondence) {
        self.correspondences.push(correspondence);
    }

    pub fn len(&self) -> usize {
        self.correspondences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correspondences.is_empty()
    }

    pub fn clear(&mut self) {
        self.correspondences.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Correspondence> {
        self.correspondences.iter()
    }

    pub fn as_slice(&self) -> &[Correspondence] {
        &self.correspondences
    }

    pub fn uses_point_a(&self, p: PixelPoint) -> bool {
        self.correspondences.iter().any(|c| c.point_a == p)
    }

    pub fn uses_point_b(&self, p: PixelPoint) -> bool {
        self.correspondences.iter().any(|c| c.point_b == p)
    }

    /// True when either point of `candidate` already belongs to an accepted correspondence.
    pub fn conflicts_with(&self, candidate: &Correspondence) -> bool {
        self.uses_point_a(candidate.point_a) || self.uses_point_b(candidate.point_b)
    }
}

impl From<Vec<Correspondence>> for CorrespondenceSet {
    fn from(correspondences: Vec<Correspondence>) -> Self {
        CorrespondenceSet { correspondences }
    }
}

impl<'a> IntoIterator for &'a CorrespondenceSet {
    type Item = &'a Correspondence;
    type IntoIter = std::slice::Iter<'a, Correspondence>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
