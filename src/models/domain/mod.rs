pub mod answer;
pub mod attempt;
pub mod content;
pub mod grade;
pub mod mock_exam;

pub use answer::{AnswerMap, EssayMap, ObjectiveAnswer, ObjectiveModule, WritingAnswer};
pub use attempt::{Attempt, AttemptScope, AttemptStatus, ScopeKind};
pub use content::{ContentPart, ExamModule, Question, SubQuestion};
pub use grade::{AnalyticScores, WritingGrade};
pub use mock_exam::{MockExam, ModuleFlags};
