use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::domain::{
        answer::WritingAnswer,
        attempt::{Attempt, AttemptStatus, ScopeKind},
        content::ExamModule,
        grade::WritingGrade,
        mock_exam::MockExam,
    },
    services::{
        answer_service::SaveOutcome,
        band_score::Band,
        module_sequencer::{ModuleEntry, ModuleFinish},
        question_identity::PartQuestionMap,
    },
};

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AttemptDto {
    pub id: String,
    pub user_id: String,
    pub scope: ScopeKind,
    pub entity_id: String,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<Attempt> for AttemptDto {
    fn from(attempt: Attempt) -> Self {
        AttemptDto {
            scope: attempt.scope.kind(),
            entity_id: attempt.scope.entity_id().to_string(),
            id: attempt.id,
            user_id: attempt.user_id,
            status: attempt.status,
            started_at: attempt.started_at,
            finished_at: attempt.finished_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginationMetadata {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl PaginationMetadata {
    pub fn new(offset: i64, limit: i64, total: i64) -> Self {
        Self {
            offset,
            limit,
            total,
            has_more: offset + limit < total,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginatedAttempts {
    pub items: Vec<AttemptDto>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Enum)]
pub enum SaveStatus {
    Skipped,
    Empty,
    Saved,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SaveResultDto {
    pub status: SaveStatus,
    pub records: i32,
}

impl From<SaveOutcome> for SaveResultDto {
    fn from(outcome: SaveOutcome) -> Self {
        let status = match outcome {
            SaveOutcome::Skipped => SaveStatus::Skipped,
            SaveOutcome::Empty => SaveStatus::Empty,
            SaveOutcome::Saved { .. } => SaveStatus::Saved,
        };
        SaveResultDto {
            status,
            records: outcome.records() as i32,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ModuleStatusDto {
    pub module: ExamModule,
    pub module_id: Option<String>,
    pub finished: bool,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct MockExamDto {
    pub id: String,
    pub test_id: String,
    pub modules: Vec<ModuleStatusDto>,
}

impl From<MockExam> for MockExamDto {
    fn from(exam: MockExam) -> Self {
        let modules = ExamModule::ORDERED
            .iter()
            .map(|module| ModuleStatusDto {
                module: *module,
                module_id: exam.module_id(*module).map(str::to_string),
                finished: exam.flags.is_finished(*module),
                unlocked: exam.flags.is_unlocked(*module),
            })
            .collect();

        MockExamDto {
            id: exam.id,
            test_id: exam.test_id,
            modules,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ModuleEntryDto {
    pub exam_id: String,
    pub test_id: String,
    pub module: ExamModule,
    pub module_id: String,
}

impl From<ModuleEntry> for ModuleEntryDto {
    fn from(entry: ModuleEntry) -> Self {
        ModuleEntryDto {
            exam_id: entry.exam_id,
            test_id: entry.test_id,
            module: entry.module,
            module_id: entry.module_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ModuleFinishDto {
    pub module: ExamModule,
    pub attempt: Option<AttemptDto>,
    /// False when the stored completion flag could not be written.
    pub flag_recorded: bool,
    pub warning: Option<String>,
    pub next_module: Option<ExamModule>,
}

impl From<ModuleFinish> for ModuleFinishDto {
    fn from(finish: ModuleFinish) -> Self {
        ModuleFinishDto {
            module: finish.module,
            attempt: finish.attempt.map(AttemptDto::from),
            flag_recorded: finish.flag.is_persisted(),
            warning: finish.flag.warning().map(str::to_string),
            next_module: finish.next_module,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionSlotDto {
    pub number: i32,
    pub question_id: String,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionMapDto {
    pub part_id: String,
    pub questions: Vec<QuestionSlotDto>,
}

impl From<PartQuestionMap> for QuestionMapDto {
    fn from(map: PartQuestionMap) -> Self {
        QuestionMapDto {
            part_id: map.part_id,
            questions: map
                .question_ids
                .into_iter()
                .map(|(number, question_id)| QuestionSlotDto {
                    number: number as i32,
                    question_id,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct WritingGradeDto {
    pub task_response: Option<f64>,
    pub lexical_resources: Option<f64>,
    pub grammar_range_and_accuracy: Option<f64>,
    pub coherence_and_cohesion: Option<f64>,
    pub band: Option<f64>,
    pub feedback: String,
    pub graded_by: String,
    pub graded_at: DateTime<Utc>,
}

impl From<WritingGrade> for WritingGradeDto {
    fn from(grade: WritingGrade) -> Self {
        WritingGradeDto {
            task_response: grade.scores.task_response,
            lexical_resources: grade.scores.lexical_resources,
            grammar_range_and_accuracy: grade.scores.grammar_range_and_accuracy,
            coherence_and_cohesion: grade.scores.coherence_and_cohesion,
            band: grade.band,
            feedback: grade.feedback,
            graded_by: grade.graded_by,
            graded_at: grade.graded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct WritingAnswerDto {
    pub id: String,
    pub attempt_id: String,
    pub task_id: String,
    pub answer_text: String,
    pub word_count: i32,
    pub updated_at: Option<DateTime<Utc>>,
    pub grade: Option<WritingGradeDto>,
}

impl From<WritingAnswer> for WritingAnswerDto {
    fn from(answer: WritingAnswer) -> Self {
        WritingAnswerDto {
            id: answer.id,
            attempt_id: answer.attempt_id,
            task_id: answer.task_id,
            answer_text: answer.answer_text,
            word_count: answer.word_count as i32,
            updated_at: answer.updated_at,
            grade: answer.grade.map(WritingGradeDto::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginatedWritingAnswers {
    pub items: Vec<WritingAnswerDto>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct BandDto {
    pub band: Option<f64>,
    /// Band formatted for display, or a placeholder when incomplete.
    pub display: String,
}

impl From<Band> for BandDto {
    fn from(band: Band) -> Self {
        BandDto {
            band: band.value(),
            display: band.to_string(),
        }
    }
}
