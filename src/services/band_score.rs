use serde::Serialize;

use crate::models::domain::grade::AnalyticScores;

pub const MIN_SUB_SCORE: f64 = 0.0;
pub const MAX_SUB_SCORE: f64 = 9.0;

/// Overall writing band, or a placeholder when any criterion is missing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Band {
    Score(f64),
    Incomplete,
}

impl Band {
    pub fn value(&self) -> Option<f64> {
        match self {
            Band::Score(band) => Some(*band),
            Band::Incomplete => None,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::Score(band) => write!(f, "{}", band),
            Band::Incomplete => f.write_str("incomplete"),
        }
    }
}

fn in_range(score: f64) -> bool {
    score.is_finite() && (MIN_SUB_SCORE..=MAX_SUB_SCORE).contains(&score)
}

/// A sub-score a grader may enter: within [0, 9] and on a half-band step.
pub fn is_valid_sub_score(score: f64) -> bool {
    in_range(score) && (score * 2.0).fract() == 0.0
}

/// Mean of the four criteria rounded to the nearest half band,
/// `round(mean * 2) / 2`.
pub fn compute_band(scores: &AnalyticScores) -> Band {
    let mut total = 0.0;

    for (_, score) in scores.criteria() {
        match score {
            Some(score) if in_range(score) => total += score,
            _ => return Band::Incomplete,
        }
    }

    let mean = total / 4.0;
    Band::Score((mean * 2.0).round() / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_scores_give_that_band() {
        let band = compute_band(&AnalyticScores::new(7.0, 7.0, 7.0, 7.0));
        assert_eq!(band, Band::Score(7.0));
    }

    #[test]
    fn quarter_mean_rounds_down_to_half_band() {
        // mean 6.625
        let band = compute_band(&AnalyticScores::new(6.0, 7.0, 6.5, 7.0));
        assert_eq!(band, Band::Score(6.5));
    }

    #[test]
    fn half_band_mean_is_kept() {
        let band = compute_band(&AnalyticScores::new(5.0, 6.0, 7.0, 8.0));
        assert_eq!(band, Band::Score(6.5));
    }

    #[test]
    fn three_quarter_mean_rounds_up_to_next_band() {
        // mean 6.75
        let band = compute_band(&AnalyticScores::new(6.5, 7.0, 6.5, 7.0));
        assert_eq!(band, Band::Score(7.0));
    }

    #[test]
    fn any_missing_score_is_incomplete() {
        let mut scores = AnalyticScores::new(7.0, 7.0, 7.0, 7.0);
        scores.coherence_and_cohesion = None;

        let band = compute_band(&scores);
        assert_eq!(band, Band::Incomplete);
        assert_eq!(band.value(), None);
        assert_eq!(band.to_string(), "incomplete");
    }

    #[test]
    fn out_of_range_score_is_incomplete() {
        assert_eq!(
            compute_band(&AnalyticScores::new(9.5, 7.0, 7.0, 7.0)),
            Band::Incomplete
        );
        assert_eq!(
            compute_band(&AnalyticScores::new(-0.5, 7.0, 7.0, 7.0)),
            Band::Incomplete
        );
        assert_eq!(
            compute_band(&AnalyticScores::new(f64::NAN, 7.0, 7.0, 7.0)),
            Band::Incomplete
        );
    }

    #[test]
    fn zero_scores_are_a_band_not_a_placeholder() {
        assert_eq!(
            compute_band(&AnalyticScores::new(0.0, 0.0, 0.0, 0.0)),
            Band::Score(0.0)
        );
    }

    #[test]
    fn sub_score_validation_requires_half_steps() {
        assert!(is_valid_sub_score(0.0));
        assert!(is_valid_sub_score(6.5));
        assert!(is_valid_sub_score(9.0));
        assert!(!is_valid_sub_score(6.25));
        assert!(!is_valid_sub_score(9.5));
        assert!(!is_valid_sub_score(-1.0));
        assert!(!is_valid_sub_score(f64::INFINITY));
    }
}
