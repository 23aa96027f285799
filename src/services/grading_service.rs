use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        answer::WritingAnswer,
        attempt::AttemptStatus,
        grade::{AnalyticScores, WritingGrade},
    },
    repositories::{AttemptRepository, GradeRepository},
    services::band_score::{compute_band, is_valid_sub_score, Band, MAX_SUB_SCORE, MIN_SUB_SCORE},
};

/// Grader-facing operations on submitted essays.
pub struct GradingService {
    grades: Arc<dyn GradeRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl GradingService {
    pub fn new(grades: Arc<dyn GradeRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { grades, attempts }
    }

    /// Ungraded essays of submitted attempts, oldest first, with their count.
    pub async fn grading_queue(
        &self,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<WritingAnswer>, i64)> {
        self.grades.find_ungraded(offset, limit).await
    }

    pub fn preview_band(&self, scores: &AnalyticScores) -> Band {
        compute_band(scores)
    }

    /// Stores a grade on a submitted essay. Partial score sets are accepted
    /// and leave the band empty until every criterion is filled in.
    pub async fn submit_grade(
        &self,
        grader_id: &str,
        answer_id: &str,
        scores: AnalyticScores,
        feedback: String,
    ) -> AppResult<WritingAnswer> {
        validate_scores(&scores)?;

        let answer = self.grades.find_answer(answer_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Writing answer '{}' not found", answer_id))
        })?;

        if self.attempt_status(&answer.attempt_id).await? != Some(AttemptStatus::Submitted) {
            return Err(AppError::InvalidState(
                "Only essays from submitted attempts can be graded".to_string(),
            ));
        }

        let band = compute_band(&scores);
        let grade = WritingGrade {
            scores,
            feedback,
            band: band.value(),
            graded_by: grader_id.to_string(),
            graded_at: Utc::now(),
        };

        let graded = self.grades.save_grade(answer_id, grade).await?;
        log::info!(
            "Writing answer {} graded by {} with band {}",
            answer_id,
            grader_id,
            band
        );
        Ok(graded)
    }

    async fn attempt_status(&self, attempt_id: &str) -> AppResult<Option<AttemptStatus>> {
        Ok(self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .map(|attempt| attempt.status))
    }
}

fn validate_scores(scores: &AnalyticScores) -> AppResult<()> {
    for (criterion, score) in scores.criteria() {
        if let Some(score) = score {
            if !is_valid_sub_score(score) {
                return Err(AppError::ValidationError(format!(
                    "{} must be between {} and {} in half-band steps, got {}",
                    criterion, MIN_SUB_SCORE, MAX_SUB_SCORE, score
                )));
            }
        }
    }
    Ok(())
}
