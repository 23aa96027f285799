use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AnswerRepository, AttemptRepository, ContentRepository, GradeRepository,
        MockExamRepository, MongoAnswerRepository, MongoAttemptRepository, MongoContentRepository,
        MongoGradeRepository, MongoMockExamRepository,
    },
    services::{
        answer_service::AnswerService, attempt_service::AttemptService,
        grading_service::GradingService, module_sequencer::ModuleSequencer,
    },
};

/// Storage seams the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub attempts: Arc<dyn AttemptRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub exams: Arc<dyn MockExamRepository>,
    pub grades: Arc<dyn GradeRepository>,
}

impl Repositories {
    pub async fn mongo(db: &Database) -> AppResult<Self> {
        let attempts = Arc::new(MongoAttemptRepository::new(db));
        attempts.ensure_indexes().await?;

        let answers = Arc::new(MongoAnswerRepository::new(db));
        answers.ensure_indexes().await?;

        let content = Arc::new(MongoContentRepository::new(db));
        content.ensure_indexes().await?;

        let exams = Arc::new(MongoMockExamRepository::new(db));
        exams.ensure_indexes().await?;

        let grades = Arc::new(MongoGradeRepository::new(db));

        Ok(Self {
            attempts,
            answers,
            content,
            exams,
            grades,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub attempt_service: Arc<AttemptService>,
    pub answer_service: Arc<AnswerService>,
    pub module_sequencer: Arc<ModuleSequencer>,
    pub grading_service: Arc<GradingService>,
    pub jwt_service: Arc<JwtService>,
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;
        let repositories = Repositories::mongo(&db).await?;

        Ok(Self::from_parts(config, db, repositories))
    }

    pub fn from_parts(config: Config, db: Database, repositories: Repositories) -> Self {
        let attempt_service = Arc::new(AttemptService::new(repositories.attempts.clone()));
        let answer_service = Arc::new(AnswerService::new(
            repositories.answers,
            repositories.content,
        ));
        let module_sequencer = Arc::new(ModuleSequencer::new(
            repositories.exams,
            attempt_service.clone(),
        ));
        let grading_service = Arc::new(GradingService::new(
            repositories.grades,
            repositories.attempts,
        ));
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        Self {
            attempt_service,
            answer_service,
            module_sequencer,
            grading_service,
            jwt_service,
            db,
            config: Arc::new(config),
        }
    }
}
