//! Fallback decision tables.
//!
//! The estimator has two points where a second estimate may replace the
//! current one. Each point is a static table of rules; the first rule whose
//! condition holds decides which estimate is carried forward and why.

use contracts::{Decision, DecisionReason, DecisionStage, TauSource};

/// Inputs to one override point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossCheck {
    /// Estimate currently held
    pub seed: f64,
    /// Competing estimate, if one was produced
    pub candidate: Option<f64>,
    /// Largest tolerated disagreement between seed and candidate
    pub tolerance: f64,
    /// Exclusive range the candidate must lie in to be considered
    pub plausible: (f64, f64),
}

impl CrossCheck {
    fn candidate_undefined(&self) -> bool {
        !self.candidate.is_some_and(f64::is_finite)
    }

    fn candidate_out_of_range(&self) -> bool {
        let (min, max) = self.plausible;
        self.candidate.is_some_and(|c| !(min < c && c < max))
    }

    fn candidate_disagrees(&self) -> bool {
        self.candidate
            .is_some_and(|c| (c - self.seed).abs() > self.tolerance)
    }
}

fn always(_: &CrossCheck) -> bool {
    true
}

/// Which side of a [`CrossCheck`] a rule keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Seed,
    Candidate,
}

/// One table row
#[derive(Clone, Copy)]
pub struct Rule {
    pub applies: fn(&CrossCheck) -> bool,
    pub pick: Pick,
    pub reason: DecisionReason,
}

/// A named decision table
#[derive(Clone, Copy)]
pub struct DecisionTable {
    pub stage: DecisionStage,
    /// Estimate the seed comes from
    pub seed_source: TauSource,
    /// Estimate the candidate comes from
    pub candidate_source: TauSource,
    pub rules: &'static [Rule],
}

/// Grid optimum versus the bump-offset guess.
///
/// A plausible guess that disagrees materially with the grid optimum wins.
pub static GUESS_CROSS_CHECK: DecisionTable = DecisionTable {
    stage: DecisionStage::GuessCrossCheck,
    seed_source: TauSource::GridOptimum,
    candidate_source: TauSource::BumpGuess,
    rules: &[
        Rule {
            applies: CrossCheck::candidate_undefined,
            pick: Pick::Seed,
            reason: DecisionReason::CandidateUndefined,
        },
        Rule {
            applies: CrossCheck::candidate_out_of_range,
            pick: Pick::Seed,
            reason: DecisionReason::CandidateOutOfRange,
        },
        Rule {
            applies: CrossCheck::candidate_disagrees,
            pick: Pick::Candidate,
            reason: DecisionReason::CandidateDisagrees,
        },
        Rule {
            applies: always,
            pick: Pick::Seed,
            reason: DecisionReason::CandidateAgrees,
        },
    ],
};

/// Minimizer output versus its seed.
///
/// A refinement that wanders further than the tolerance is discarded.
pub static REFINEMENT_CHECK: DecisionTable = DecisionTable {
    stage: DecisionStage::RefinementCheck,
    seed_source: TauSource::GridOptimum,
    candidate_source: TauSource::Refined,
    rules: &[
        Rule {
            applies: CrossCheck::candidate_undefined,
            pick: Pick::Seed,
            reason: DecisionReason::CandidateUndefined,
        },
        Rule {
            applies: CrossCheck::candidate_disagrees,
            pick: Pick::Seed,
            reason: DecisionReason::CandidateDisagrees,
        },
        Rule {
            applies: always,
            pick: Pick::Candidate,
            reason: DecisionReason::CandidateAgrees,
        },
    ],
};

/// Apply the first matching rule of `table`.
///
/// `seed_source` overrides the table's default provenance for the seed, for
/// stages whose seed may itself come from an earlier override.
pub fn resolve(
    table: &DecisionTable,
    check: &CrossCheck,
    seed_source: Option<TauSource>,
) -> Decision {
    let seed_source = seed_source.unwrap_or(table.seed_source);
    let rule = table.rules.iter().find(|rule| (rule.applies)(check));

    match (rule, check.candidate) {
        (Some(rule), Some(candidate)) if rule.pick == Pick::Candidate => Decision {
            stage: table.stage,
            selected: table.candidate_source,
            reason: rule.reason,
            tau: candidate,
        },
        (Some(rule), _) => Decision {
            stage: table.stage,
            selected: seed_source,
            reason: rule.reason,
            tau: check.seed,
        },
        (None, _) => Decision {
            stage: table.stage,
            selected: seed_source,
            reason: DecisionReason::CandidateUndefined,
            tau: check.seed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess_check(seed: f64, guess: Option<f64>) -> CrossCheck {
        CrossCheck {
            seed,
            candidate: guess,
            tolerance: 0.1,
            plausible: (0.0, 1.0),
        }
    }

    fn refine_check(seed: f64, refined: f64) -> CrossCheck {
        CrossCheck {
            seed,
            candidate: Some(refined),
            tolerance: 0.01,
            plausible: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    #[test]
    fn test_guess_overrides_distant_grid_optimum() {
        let d = resolve(&GUESS_CROSS_CHECK, &guess_check(0.02, Some(0.25)), None);
        assert_eq!(d.selected, TauSource::BumpGuess);
        assert_eq!(d.reason, DecisionReason::CandidateDisagrees);
        assert_eq!(d.tau, 0.25);
    }

    #[test]
    fn test_close_guess_keeps_grid_optimum() {
        let d = resolve(&GUESS_CROSS_CHECK, &guess_check(0.22, Some(0.25)), None);
        assert_eq!(d.selected, TauSource::GridOptimum);
        assert_eq!(d.reason, DecisionReason::CandidateAgrees);
        assert_eq!(d.tau, 0.22);
    }

    #[test]
    fn test_implausible_guess_is_ignored() {
        for guess in [0.0, 1.0, -0.3, 1.7] {
            let d = resolve(&GUESS_CROSS_CHECK, &guess_check(0.3, Some(guess)), None);
            assert_eq!(d.reason, DecisionReason::CandidateOutOfRange, "guess {guess}");
            assert_eq!(d.tau, 0.3);
        }
    }

    #[test]
    fn test_missing_guess() {
        let d = resolve(&GUESS_CROSS_CHECK, &guess_check(0.3, None), None);
        assert_eq!(d.reason, DecisionReason::CandidateUndefined);
        let d = resolve(&GUESS_CROSS_CHECK, &guess_check(0.3, Some(f64::NAN)), None);
        assert_eq!(d.reason, DecisionReason::CandidateUndefined);
    }

    #[test]
    fn test_refinement_accepted_within_tolerance() {
        let d = resolve(&REFINEMENT_CHECK, &refine_check(0.25, 0.253), None);
        assert_eq!(d.selected, TauSource::Refined);
        assert_eq!(d.tau, 0.253);
    }

    #[test]
    fn test_diverged_refinement_keeps_seed_provenance() {
        let d = resolve(
            &REFINEMENT_CHECK,
            &refine_check(0.25, 0.4),
            Some(TauSource::BumpGuess),
        );
        assert_eq!(d.selected, TauSource::BumpGuess);
        assert_eq!(d.reason, DecisionReason::CandidateDisagrees);
        assert_eq!(d.tau, 0.25);
    }

    #[test]
    fn test_every_table_ends_with_catch_all() {
        for table in [&GUESS_CROSS_CHECK, &REFINEMENT_CHECK] {
            let last = table.rules.last().unwrap();
            assert!((last.applies)(&guess_check(f64::NAN, None)));
        }
    }
}
