use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        answer::{
            word_count, AnswerMap, EssayMap, ObjectiveAnswer, ObjectiveModule, WritingAnswer,
        },
        attempt::{Attempt, AttemptScope},
        content::{ContentPart, ExamModule},
    },
    repositories::{AnswerRepository, ContentRepository},
    services::question_identity::{resolve_question_ids, PartQuestionMap},
};

/// Result of one save cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SaveOutcome {
    /// No attempt is open yet, nothing was sent.
    Skipped,
    /// Nothing answered yet; no call was made.
    Empty,
    Saved { records: usize },
}

impl SaveOutcome {
    pub fn records(&self) -> usize {
        match self {
            SaveOutcome::Saved { records } => *records,
            SaveOutcome::Skipped | SaveOutcome::Empty => 0,
        }
    }
}

/// Builds the answer rows for every mapped question the learner has answered.
/// Unanswered items are left out rather than stored as empty strings.
pub fn build_objective_batch(
    attempt_id: &str,
    module: ObjectiveModule,
    answers: &AnswerMap,
    mappings: &[PartQuestionMap],
) -> Vec<ObjectiveAnswer> {
    mappings
        .iter()
        .flat_map(|mapping| {
            mapping
                .question_ids
                .iter()
                .filter_map(move |(number, question_id)| {
                    let answer = answers.get(number).filter(|value| !value.is_empty())?;
                    Some(ObjectiveAnswer {
                        attempt_id: attempt_id.to_string(),
                        module,
                        part_id: mapping.part_id.clone(),
                        question_id: question_id.clone(),
                        question_number: *number,
                        answer: answer.clone(),
                        updated_at: None,
                    })
                })
        })
        .collect()
}

/// One row per task with non-blank text, word count computed here.
pub fn build_writing_batch(attempt_id: &str, essays: &EssayMap) -> Vec<WritingAnswer> {
    essays
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(task_id, text)| WritingAnswer {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt_id.to_string(),
            task_id: task_id.clone(),
            answer_text: text.clone(),
            word_count: word_count(text),
            updated_at: None,
            grade: None,
        })
        .collect()
}

fn ensure_part_in_scope(
    attempt: &Attempt,
    module: ObjectiveModule,
    part: &ContentPart,
) -> AppResult<()> {
    let in_scope = part.module == ExamModule::from(module)
        && match &attempt.scope {
            AttemptScope::Part { part_id } => part_id == &part.id,
            AttemptScope::Module { module_id } => module_id == &part.module_id,
            AttemptScope::Test { .. } => true,
            AttemptScope::Task { .. } => false,
        };

    if !in_scope {
        return Err(AppError::ValidationError(format!(
            "Part '{}' is outside the {} scope of attempt '{}'",
            part.id,
            module.as_str(),
            attempt.id
        )));
    }
    Ok(())
}

/// Persists learner answers for the three answerable module kinds.
pub struct AnswerService {
    answers: Arc<dyn AnswerRepository>,
    content: Arc<dyn ContentRepository>,
}

impl AnswerService {
    pub fn new(answers: Arc<dyn AnswerRepository>, content: Arc<dyn ContentRepository>) -> Self {
        Self { answers, content }
    }

    pub async fn save_reading(
        &self,
        attempt_id: &str,
        answers: &AnswerMap,
        mappings: &[PartQuestionMap],
    ) -> AppResult<SaveOutcome> {
        self.save_objective(attempt_id, ObjectiveModule::Reading, answers, mappings)
            .await
    }

    pub async fn save_listening(
        &self,
        attempt_id: &str,
        answers: &AnswerMap,
        mappings: &[PartQuestionMap],
    ) -> AppResult<SaveOutcome> {
        self.save_objective(attempt_id, ObjectiveModule::Listening, answers, mappings)
            .await
    }

    pub async fn save_objective(
        &self,
        attempt_id: &str,
        module: ObjectiveModule,
        answers: &AnswerMap,
        mappings: &[PartQuestionMap],
    ) -> AppResult<SaveOutcome> {
        let batch = build_objective_batch(attempt_id, module, answers, mappings);
        if batch.is_empty() {
            log::debug!("No {} answers to save for attempt {}", module.as_str(), attempt_id);
            return Ok(SaveOutcome::Empty);
        }

        let records = self.answers.save_objective_batch(batch).await?;
        log::debug!(
            "Saved {} {} answers for attempt {}",
            records,
            module.as_str(),
            attempt_id
        );
        Ok(SaveOutcome::Saved { records })
    }

    /// Resolves the question map for `part_ids` from stored content, then saves.
    /// Every part must exist, belong to `module` and fall inside the attempt's
    /// scope.
    pub async fn save_objective_for_parts(
        &self,
        attempt: &Attempt,
        module: ObjectiveModule,
        part_ids: Vec<String>,
        answers: &AnswerMap,
    ) -> AppResult<SaveOutcome> {
        let parts = self.content.find_by_ids(part_ids.clone()).await?;

        let missing: Vec<&str> = part_ids
            .iter()
            .filter(|id| !parts.iter().any(|part| &part.id == *id))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "Unknown parts: {}",
                missing.join(", ")
            )));
        }

        for part in &parts {
            ensure_part_in_scope(attempt, module, part)?;
        }

        let mappings = resolve_question_ids(&parts);
        self.save_objective(&attempt.id, module, answers, &mappings)
            .await
    }

    pub async fn question_map(&self, part_ids: Vec<String>) -> AppResult<Vec<PartQuestionMap>> {
        let parts = self.content.find_by_ids(part_ids).await?;
        Ok(resolve_question_ids(&parts))
    }

    pub async fn module_question_map(&self, module_id: &str) -> AppResult<Vec<PartQuestionMap>> {
        let parts = self.content.find_by_module(module_id).await?;
        Ok(resolve_question_ids(&parts))
    }

    pub async fn save_writing(&self, attempt_id: &str, essays: &EssayMap) -> AppResult<SaveOutcome> {
        let batch = build_writing_batch(attempt_id, essays);
        if batch.is_empty() {
            log::debug!("No essays to save for attempt {}", attempt_id);
            return Ok(SaveOutcome::Empty);
        }

        let records = self.answers.save_writing_batch(batch).await?;
        log::debug!("Saved {} essays for attempt {}", records, attempt_id);
        Ok(SaveOutcome::Saved { records })
    }

    pub async fn objective_answers(&self, attempt_id: &str) -> AppResult<Vec<ObjectiveAnswer>> {
        self.answers.find_objective_by_attempt(attempt_id).await
    }

    pub async fn writing_answers(&self, attempt_id: &str) -> AppResult<Vec<WritingAnswer>> {
        self.answers.find_writing_by_attempt(attempt_id).await
    }
}
