//! Nearest-color search over tile signatures
//!
//! Distances are exact integers, so ties are real ties and always resolve to
//! the lowest candidate index. Euclidean distance is compared squared, which
//! preserves its ordering.

use crate::algorithm::cache::MatchCache;
use crate::analysis::signature::ColorSignature;
use bitvec::vec::BitVec;

/// Color distance used by every search of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum DistanceMetric {
    /// Straight-line distance in RGB space
    #[default]
    Euclidean,
    /// Summed absolute channel difference
    Manhattan,
}

impl DistanceMetric {
    /// Distance between two colors under this metric
    ///
    /// Euclidean distances are returned squared.
    pub fn distance(self, a: &ColorSignature, b: &ColorSignature) -> u32 {
        match self {
            Self::Euclidean => a.squared_euclidean(b),
            Self::Manhattan => a.manhattan(b),
        }
    }
}

/// Index of the signature closest to `query`; the lowest index wins ties
pub fn nearest(
    signatures: &[ColorSignature],
    query: ColorSignature,
    metric: DistanceMetric,
) -> Option<usize> {
    signatures
        .iter()
        .enumerate()
        .min_by_key(|(_, signature)| metric.distance(signature, &query))
        .map(|(index, _)| index)
}

/// Like [`nearest`], skipping indices set in `excluded` and then excluding the winner
///
/// `excluded` grows to cover `signatures` if it is shorter. Returns `None`
/// once every candidate has been used.
pub fn nearest_without_replacement(
    signatures: &[ColorSignature],
    query: ColorSignature,
    metric: DistanceMetric,
    excluded: &mut BitVec,
) -> Option<usize> {
    if excluded.len() < signatures.len() {
        excluded.resize(signatures.len(), false);
    }

    let winner = signatures
        .iter()
        .enumerate()
        .filter(|(index, _)| !excluded.get(*index).is_some_and(|bit| *bit))
        .min_by_key(|(_, signature)| metric.distance(signature, &query))
        .map(|(index, _)| index)?;

    excluded.set(winner, true);
    Some(winner)
}

/// Candidate signatures bound to one metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    signatures: Vec<ColorSignature>,
    metric: DistanceMetric,
}

impl Matcher {
    /// Matcher over `signatures` in candidate order
    pub const fn new(signatures: Vec<ColorSignature>, metric: DistanceMetric) -> Self {
        Self {
            signatures,
            metric,
        }
    }

    /// Metric in use
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether there are no candidates
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Closest candidate to `query`
    pub fn nearest(&self, query: ColorSignature) -> Option<usize> {
        nearest(&self.signatures, query, self.metric)
    }

    /// Closest candidate to `query`, memoized in `cache`
    pub fn nearest_cached(&self, query: ColorSignature, cache: &mut MatchCache) -> Option<usize> {
        cache.get_or_compute(query, || self.nearest(query))
    }
}
