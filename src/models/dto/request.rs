use async_graphql::InputObject;
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{
    answer::{AnswerMap, EssayMap},
    attempt::ScopeKind,
    content::ExamModule,
    grade::AnalyticScores,
};

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct StartAttemptInput {
    pub scope: ScopeKind,

    #[validate(length(min = 1, max = 100))]
    pub entity_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct NumberedAnswerInput {
    #[validate(range(min = 1))]
    pub number: i32,

    #[validate(length(max = 500))]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SaveObjectiveAnswersInput {
    #[validate(length(min = 1))]
    pub attempt_id: String,

    /// Parts whose questions the numbers refer to.
    #[validate(length(min = 1, max = 10))]
    pub part_ids: Vec<String>,

    #[validate(nested)]
    pub answers: Vec<NumberedAnswerInput>,
}

impl SaveObjectiveAnswersInput {
    /// Later entries for the same number replace earlier ones.
    pub fn answer_map(&self) -> AnswerMap {
        self.answers
            .iter()
            .filter(|answer| answer.number > 0)
            .map(|answer| (answer.number as u32, answer.value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct EssayInput {
    #[validate(length(min = 1))]
    pub task_id: String,

    #[validate(length(max = 20000))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SaveWritingAnswersInput {
    #[validate(length(min = 1))]
    pub attempt_id: String,

    #[validate(nested)]
    pub essays: Vec<EssayInput>,
}

impl SaveWritingAnswersInput {
    pub fn essay_map(&self) -> EssayMap {
        self.essays
            .iter()
            .map(|essay| (essay.task_id.clone(), essay.text.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct FinishModuleInput {
    #[validate(length(min = 1))]
    pub exam_id: String,

    pub module: ExamModule,

    /// Attempt that tracked the module's answers, if any.
    pub attempt_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct BandScoresInput {
    #[validate(range(min = 0.0, max = 9.0))]
    pub task_response: Option<f64>,

    #[validate(range(min = 0.0, max = 9.0))]
    pub lexical_resources: Option<f64>,

    #[validate(range(min = 0.0, max = 9.0))]
    pub grammar_range_and_accuracy: Option<f64>,

    #[validate(range(min = 0.0, max = 9.0))]
    pub coherence_and_cohesion: Option<f64>,
}

impl From<BandScoresInput> for AnalyticScores {
    fn from(input: BandScoresInput) -> Self {
        AnalyticScores {
            task_response: input.task_response,
            lexical_resources: input.lexical_resources,
            grammar_range_and_accuracy: input.grammar_range_and_accuracy,
            coherence_and_cohesion: input.coherence_and_cohesion,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SubmitGradeInput {
    #[validate(length(min = 1))]
    pub answer_id: String,

    #[validate(nested)]
    pub scores: BandScoresInput,

    #[validate(length(max = 5000))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self { offset, limit }
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
