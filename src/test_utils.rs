#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use crate::{
        app_state::{AppState, Repositories},
        auth::{Claims, UserRole},
        config::Config,
        db::Database,
        models::domain::{
            attempt::{Attempt, AttemptScope, ScopeKind},
            mock_exam::{MockExam, ModuleFlags},
        },
        repositories::{
            answer_repository::MockAnswerRepository, attempt_repository::MockAttemptRepository,
            content_repository::MockContentRepository, grade_repository::MockGradeRepository,
            mock_exam_repository::MockMockExamRepository,
        },
    };

    /// An in-progress attempt with a fixed id.
    pub fn open_attempt(id: &str, user_id: &str, scope: ScopeKind, entity_id: &str) -> Attempt {
        let mut attempt = Attempt::start(
            user_id,
            AttemptScope::new(scope, entity_id).expect("fixture scope is valid"),
        );
        attempt.id = id.to_string();
        attempt
    }

    /// A mock exam with all three modules wired and no flags set.
    pub fn mock_exam(id: &str, user_id: &str) -> MockExam {
        MockExam {
            id: id.to_string(),
            user_id: user_id.to_string(),
            test_id: "test-1".to_string(),
            listening_module_id: Some("L1".to_string()),
            reading_module_id: Some("R1".to_string()),
            writing_module_id: Some("W1".to_string()),
            flags: ModuleFlags::default(),
        }
    }

    pub fn claims(user_id: &str, role: UserRole) -> Claims {
        Claims::new(user_id, role, 1)
    }

    /// Repositories whose mocks fail the test on any call.
    pub fn untouched_repositories() -> Repositories {
        Repositories {
            attempts: Arc::new(MockAttemptRepository::new()),
            answers: Arc::new(MockAnswerRepository::new()),
            content: Arc::new(MockContentRepository::new()),
            exams: Arc::new(MockMockExamRepository::new()),
            grades: Arc::new(MockGradeRepository::new()),
        }
    }

    /// Application state over the given repositories. The database client is
    /// built but never contacted.
    pub async fn test_state(repositories: Repositories) -> AppState {
        let config = Config::test_config();
        let db = Database::from_config(&config)
            .await
            .expect("test connection string parses");
        AppState::from_parts(config, db, repositories)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::{attempt::ScopeKind, content::ExamModule};

    #[test]
    fn test_fixture_attempt_is_open() {
        let attempt = open_attempt("a-1", "user-1", ScopeKind::Part, "P1");
        assert_eq!(attempt.id, "a-1");
        assert!(attempt.is_open());
    }

    #[test]
    fn test_fixture_exam_starts_at_listening() {
        let exam = mock_exam("exam-1", "user-1");
        assert!(exam.flags.is_unlocked(ExamModule::Listening));
        assert!(!exam.flags.is_unlocked(ExamModule::Reading));
    }
}
