//! SyncResult - Sync Engine output
//!
//! Short-lived values produced during one synchronization call.

use serde::{Deserialize, Serialize};

/// Index window around the dominant transient of a signal.
///
/// `start`/`end` are signed: a peak close to either array boundary yields a
/// window reaching outside `[0, len)`, which callers must reject or tolerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpWindow {
    /// One quarter-window before the peak
    pub start: isize,
    /// Index of the dominant extremum
    pub peak: usize,
    /// Three quarter-windows after the peak
    pub end: isize,
}

impl BumpWindow {
    /// True when the whole window lies inside a signal of length `len`
    pub fn is_within(&self, len: usize) -> bool {
        self.start >= 0 && self.end <= len as isize
    }

    /// Window length in samples
    pub fn width(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }
}

/// Half-open index range `[start, end)` of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// True for a single missing sample, false for a run of valid samples
    pub missing: bool,
}

impl Segment {
    pub fn valid(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            missing: false,
        }
    }

    pub fn missing(index: usize) -> Self {
        Self {
            start: index,
            end: index + 1,
            missing: true,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// The `(start, end)` pair
    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

/// Ordered segments tiling `[0, len)` exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentIndexList {
    segments: Vec<Segment>,
}

impl SegmentIndexList {
    /// Wrap already-tiling segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// `(start, end)` pairs in order
    pub fn bounds(&self) -> Vec<(usize, usize)> {
        self.segments.iter().map(Segment::bounds).collect()
    }

    /// Segment containing `index`, if any
    pub fn containing(&self, index: usize) -> Option<&Segment> {
        // Segments are sorted and contiguous
        let pos = self.segments.partition_point(|s| s.end <= index);
        self.segments.get(pos).filter(|s| s.contains(index))
    }

    /// Valid (non-missing) segments only
    pub fn valid(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| !s.missing)
    }
}

/// Misalignment cost sampled over a tau grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorLandscape {
    points: Vec<(f64, f64)>,
}

impl ErrorLandscape {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, tau: f64, error: f64) {
        self.points.push((tau, error));
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(tau, error)` with the smallest error; the first one wins on ties.
    /// NaN and infinite errors never win.
    pub fn minimum(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .copied()
            .filter(|(_, e)| e.is_finite())
            .fold(None, |best, point| match best {
                Some((_, e)) if e <= point.1 => best,
                _ => Some(point),
            })
    }
}

/// Which estimate a tau value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TauSource {
    /// Minimum of the error landscape grid
    GridOptimum,
    /// Difference of the two bump peak indices
    BumpGuess,
    /// Output of the local minimizer
    Refined,
}

impl TauSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GridOptimum => "grid_optimum",
            Self::BumpGuess => "bump_guess",
            Self::Refined => "refined",
        }
    }
}

/// Override point in the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    /// Grid optimum versus the bump-offset guess
    GuessCrossCheck,
    /// Minimizer output versus its seed
    RefinementCheck,
}

impl DecisionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GuessCrossCheck => "guess_cross_check",
            Self::RefinementCheck => "refinement_check",
        }
    }
}

/// Why a decision table row fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// No candidate estimate was produced
    CandidateUndefined,
    /// The candidate lies outside its plausible range
    CandidateOutOfRange,
    /// Candidate and seed disagree by more than the tolerance
    CandidateDisagrees,
    /// Candidate and seed agree within the tolerance
    CandidateAgrees,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CandidateUndefined => "candidate_undefined",
            Self::CandidateOutOfRange => "candidate_out_of_range",
            Self::CandidateDisagrees => "candidate_disagrees",
            Self::CandidateAgrees => "candidate_agrees",
        }
    }
}

/// One resolved row of a fallback decision table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub stage: DecisionStage,
    pub selected: TauSource,
    pub reason: DecisionReason,
    /// Value carried forward after this decision
    pub tau: f64,
}

/// Final time shift plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Selected time shift (seconds) of stream B relative to stream A
    pub tau: f64,
    /// Estimate the selected tau came from
    pub source: TauSource,
    /// Grid optimum of the error landscape
    pub grid_tau: f64,
    /// Error at the grid optimum
    pub min_error: f64,
    /// Bump-offset guess, when defined
    pub guess: Option<f64>,
    /// Seed handed to the minimizer (grid optimum or guess)
    pub seed_tau: f64,
    /// Raw minimizer output
    pub refined_tau: f64,
    /// Valid segment of stream B the search was restricted to
    pub segment: Segment,
    /// Bump window located in filtered stream A
    pub reference_bump: BumpWindow,
    /// Bump window located in filtered/reconstructed stream B
    pub shifted_bump: BumpWindow,
    /// Ordered override decisions
    pub decisions: Vec<Decision>,
}

impl SyncResult {
    /// True when any decision replaced its seed
    pub fn was_overridden(&self) -> bool {
        self.decisions
            .iter()
            .any(|d| d.reason == DecisionReason::CandidateDisagrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_window_bounds() {
        let window = BumpWindow {
            start: -3,
            peak: 2,
            end: 11,
        };
        assert!(!window.is_within(100));
        assert_eq!(window.width(), 14);

        let inside = BumpWindow {
            start: 10,
            peak: 15,
            end: 30,
        };
        assert!(inside.is_within(30));
        assert!(!inside.is_within(29));
    }

    #[test]
    fn test_containing_segment() {
        let list = SegmentIndexList::from_segments(vec![
            Segment::valid(0, 4),
            Segment::missing(4),
            Segment::valid(5, 9),
        ]);
        assert_eq!(list.containing(0), Some(&Segment::valid(0, 4)));
        assert_eq!(list.containing(4), Some(&Segment::missing(4)));
        assert_eq!(list.containing(8), Some(&Segment::valid(5, 9)));
        assert_eq!(list.containing(9), None);
        assert_eq!(list.valid().count(), 2);
    }

    #[test]
    fn test_landscape_minimum_first_wins() {
        let mut landscape = ErrorLandscape::with_capacity(4);
        landscape.push(0.0, 3.0);
        landscape.push(0.1, 1.0);
        landscape.push(0.2, f64::NAN);
        landscape.push(0.3, 1.0);
        assert_eq!(landscape.minimum(), Some((0.1, 1.0)));
    }

    #[test]
    fn test_landscape_minimum_empty() {
        assert_eq!(ErrorLandscape::default().minimum(), None);

        let mut unscored = ErrorLandscape::default();
        unscored.push(0.4, f64::INFINITY);
        assert_eq!(unscored.minimum(), None);
    }
}
