#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use ielts_mock_server::{
    errors::{AppError, AppResult},
    models::domain::{
        AnalyticScores, Attempt, AttemptStatus, ContentPart, ExamModule, MockExam, ModuleFlags,
        ObjectiveAnswer, Question, SubQuestion, WritingAnswer, WritingGrade,
    },
    repositories::{
        AnswerRepository, AttemptRepository, ContentRepository, GradeRepository,
        MockExamRepository,
    },
    services::{
        answer_service::AnswerService, attempt_service::AttemptService,
        grading_service::GradingService, module_sequencer::ModuleSequencer,
    },
};

#[derive(Default)]
pub struct InMemoryAttemptRepository {
    attempts: RwLock<HashMap<String, Attempt>>,
    pub creates: AtomicUsize,
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        let mut attempts = self.attempts.write().await;
        if attempts.contains_key(&attempt.id) {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' already exists",
                attempt.id
            )));
        }

        self.creates.fetch_add(1, Ordering::SeqCst);
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        Ok(self.attempts.read().await.get(id).cloned())
    }

    async fn finish(
        &self,
        id: &str,
        status: AttemptStatus,
        finished_at: DateTime<Utc>,
    ) -> AppResult<Option<Attempt>> {
        let mut attempts = self.attempts.write().await;
        let Some(attempt) = attempts.get_mut(id) else {
            return Ok(None);
        };

        if attempt.status != AttemptStatus::InProgress {
            return Ok(None);
        }

        attempt.status = status;
        attempt.finished_at = Some(finished_at);
        Ok(Some(attempt.clone()))
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Attempt>, i64)> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}

/// Answer store. Writing answers live in a table shared with the grade
/// repository, the way both Mongo repositories share one collection.
#[derive(Default)]
pub struct InMemoryAnswerRepository {
    objective: RwLock<HashMap<(String, String, String), ObjectiveAnswer>>,
    writing: Arc<RwLock<Vec<WritingAnswer>>>,
    pub fail_writes: AtomicBool,
    pub batch_calls: AtomicUsize,
}

impl InMemoryAnswerRepository {
    pub fn writing_table(&self) -> Arc<RwLock<Vec<WritingAnswer>>> {
        self.writing.clone()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("write concern timeout".to_string()));
        }
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AnswerRepository for InMemoryAnswerRepository {
    async fn save_objective_batch(&self, answers: Vec<ObjectiveAnswer>) -> AppResult<usize> {
        self.check_writable()?;

        let mut objective = self.objective.write().await;
        let count = answers.len();
        for mut answer in answers {
            answer.updated_at = Some(Utc::now());
            let key = (
                answer.attempt_id.clone(),
                answer.part_id.clone(),
                answer.question_id.clone(),
            );
            objective.insert(key, answer);
        }
        Ok(count)
    }

    async fn save_writing_batch(&self, answers: Vec<WritingAnswer>) -> AppResult<usize> {
        self.check_writable()?;

        let mut writing = self.writing.write().await;
        let count = answers.len();
        for answer in answers {
            let existing = writing
                .iter_mut()
                .find(|w| w.attempt_id == answer.attempt_id && w.task_id == answer.task_id);

            match existing {
                Some(stored) => {
                    stored.answer_text = answer.answer_text;
                    stored.word_count = answer.word_count;
                    stored.updated_at = Some(Utc::now());
                }
                None => writing.push(WritingAnswer {
                    updated_at: Some(Utc::now()),
                    ..answer
                }),
            }
        }
        Ok(count)
    }

    async fn find_objective_by_attempt(
        &self,
        attempt_id: &str,
    ) -> AppResult<Vec<ObjectiveAnswer>> {
        let objective = self.objective.read().await;
        let mut answers: Vec<_> = objective
            .values()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect();
        answers.sort_by(|a, b| {
            (a.question_number, &a.part_id).cmp(&(b.question_number, &b.part_id))
        });
        Ok(answers)
    }

    async fn find_writing_by_attempt(&self, attempt_id: &str) -> AppResult<Vec<WritingAnswer>> {
        let writing = self.writing.read().await;
        Ok(writing
            .iter()
            .filter(|w| w.attempt_id == attempt_id)
            .cloned()
            .collect())
    }
}

pub struct InMemoryContentRepository {
    parts: Vec<ContentPart>,
}

impl InMemoryContentRepository {
    pub fn new(parts: Vec<ContentPart>) -> Self {
        Self { parts }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn find_by_module(&self, module_id: &str) -> AppResult<Vec<ContentPart>> {
        let mut parts: Vec<_> = self
            .parts
            .iter()
            .filter(|p| p.module_id == module_id)
            .cloned()
            .collect();
        parts.sort_by_key(|p| p.order);
        Ok(parts)
    }

    async fn find_by_ids(&self, part_ids: Vec<String>) -> AppResult<Vec<ContentPart>> {
        Ok(part_ids
            .iter()
            .filter_map(|id| self.parts.iter().find(|p| &p.id == id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryMockExamRepository {
    exams: RwLock<HashMap<String, MockExam>>,
    pub fail_flag_writes: AtomicBool,
    pub flag_writes: AtomicUsize,
}

impl InMemoryMockExamRepository {
    pub async fn insert(&self, exam: MockExam) {
        self.exams.write().await.insert(exam.id.clone(), exam);
    }

    pub async fn stored_flags(&self, id: &str) -> Option<ModuleFlags> {
        self.exams.read().await.get(id).map(|exam| exam.flags)
    }
}

#[async_trait]
impl MockExamRepository for InMemoryMockExamRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<MockExam>> {
        Ok(self.exams.read().await.get(id).cloned())
    }

    async fn mark_module_finished(&self, id: &str, module: ExamModule) -> AppResult<()> {
        if self.fail_flag_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("not primary".to_string()));
        }

        let mut exams = self.exams.write().await;
        let exam = exams
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Mock exam with id '{}' not found", id)))?;

        self.flag_writes.fetch_add(1, Ordering::SeqCst);
        exam.flags.mark_finished(module);
        Ok(())
    }
}

/// Reads the shared writing table and joins attempts the way the Mongo
/// pipeline does.
pub struct InMemoryGradeRepository {
    writing: Arc<RwLock<Vec<WritingAnswer>>>,
    attempts: Arc<InMemoryAttemptRepository>,
}

impl InMemoryGradeRepository {
    pub fn new(
        writing: Arc<RwLock<Vec<WritingAnswer>>>,
        attempts: Arc<InMemoryAttemptRepository>,
    ) -> Self {
        Self { writing, attempts }
    }
}

#[async_trait]
impl GradeRepository for InMemoryGradeRepository {
    async fn find_ungraded(&self, offset: i64, limit: i64) -> AppResult<(Vec<WritingAnswer>, i64)> {
        let writing = self.writing.read().await;
        let attempts = self.attempts.attempts.read().await;
        let mut items: Vec<_> = writing
            .iter()
            .filter(|w| w.grade.is_none())
            .filter(|w| {
                attempts
                    .get(&w.attempt_id)
                    .map(|a| a.status == AttemptStatus::Submitted)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.updated_at, &a.id).cmp(&(b.updated_at, &b.id)));

        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_answer(&self, answer_id: &str) -> AppResult<Option<WritingAnswer>> {
        let writing = self.writing.read().await;
        Ok(writing.iter().find(|w| w.id == answer_id).cloned())
    }

    async fn save_grade(&self, answer_id: &str, grade: WritingGrade) -> AppResult<WritingAnswer> {
        let mut writing = self.writing.write().await;
        let answer = writing
            .iter_mut()
            .find(|w| w.id == answer_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Writing answer with id '{}' not found", answer_id))
            })?;

        answer.grade = Some(grade);
        Ok(answer.clone())
    }
}

pub const LEARNER: &str = "learner-1";
pub const EXAM_ID: &str = "exam-1";

/// Listening module `L1` (questions 1-4 over two parts, with a shared
/// number 1 in the second part) and reading module `R1` (questions 1-5,
/// where 4 and 5 are sub-questions of one group).
pub fn content_fixture() -> Vec<ContentPart> {
    vec![
        ContentPart {
            id: "LP1".to_string(),
            module_id: "L1".to_string(),
            module: ExamModule::Listening,
            order: 1,
            title: Some("Section 1".to_string()),
            questions: (1..=4)
                .map(|n| Question::numbered(&format!("LP1-q{}", n), n))
                .collect(),
        },
        ContentPart {
            id: "RP1".to_string(),
            module_id: "R1".to_string(),
            module: ExamModule::Reading,
            order: 1,
            title: Some("Passage 1".to_string()),
            questions: vec![
                Question::numbered("RP1-q1", 1),
                Question::numbered("RP1-q2", 2),
                Question::numbered("RP1-q3", 3),
                Question::group(
                    "RP1-g1",
                    vec![
                        SubQuestion {
                            id: "RP1-g1-a".to_string(),
                            question_number: Some(4),
                        },
                        SubQuestion {
                            id: "RP1-g1-b".to_string(),
                            question_number: Some(5),
                        },
                    ],
                ),
            ],
        },
    ]
}

pub fn exam_fixture() -> MockExam {
    MockExam {
        id: EXAM_ID.to_string(),
        user_id: LEARNER.to_string(),
        test_id: "test-1".to_string(),
        listening_module_id: Some("L1".to_string()),
        reading_module_id: Some("R1".to_string()),
        writing_module_id: Some("W1".to_string()),
        flags: ModuleFlags::default(),
    }
}

pub fn scores(values: [f64; 4]) -> AnalyticScores {
    AnalyticScores::new(values[0], values[1], values[2], values[3])
}

/// Services wired over in-memory repositories, with handles on the fakes.
pub struct Harness {
    pub attempts_repo: Arc<InMemoryAttemptRepository>,
    pub answers_repo: Arc<InMemoryAnswerRepository>,
    pub exams_repo: Arc<InMemoryMockExamRepository>,
    pub attempts: Arc<AttemptService>,
    pub answers: Arc<AnswerService>,
    pub sequencer: Arc<ModuleSequencer>,
    pub grading: Arc<GradingService>,
}

impl Harness {
    pub async fn new() -> Self {
        let attempts_repo = Arc::new(InMemoryAttemptRepository::default());
        let answers_repo = Arc::new(InMemoryAnswerRepository::default());
        let content_repo = Arc::new(InMemoryContentRepository::new(content_fixture()));
        let exams_repo = Arc::new(InMemoryMockExamRepository::default());
        let grades_repo = Arc::new(InMemoryGradeRepository::new(
            answers_repo.writing_table(),
            attempts_repo.clone(),
        ));

        exams_repo.insert(exam_fixture()).await;

        let attempts = Arc::new(AttemptService::new(attempts_repo.clone()));
        let answers = Arc::new(AnswerService::new(answers_repo.clone(), content_repo));
        let sequencer = Arc::new(ModuleSequencer::new(exams_repo.clone(), attempts.clone()));
        let grading = Arc::new(GradingService::new(grades_repo, attempts_repo.clone()));

        Self {
            attempts_repo,
            answers_repo,
            exams_repo,
            attempts,
            answers,
            sequencer,
            grading,
        }
    }
}
