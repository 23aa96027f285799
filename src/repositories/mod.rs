pub mod answer_repository;
pub mod attempt_repository;
pub mod content_repository;
pub mod grade_repository;
pub mod mock_exam_repository;

pub use answer_repository::{AnswerRepository, MongoAnswerRepository};
pub use attempt_repository::{AttemptRepository, MongoAttemptRepository};
pub use content_repository::{ContentRepository, MongoContentRepository};
pub use grade_repository::{GradeRepository, MongoGradeRepository};
pub use mock_exam_repository::{MockExamRepository, MongoMockExamRepository};
