use async_graphql::Enum;
use serde::{Deserialize, Serialize};

/// One of the three answerable skill sections of a mock exam, in unlock order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum ExamModule {
    Listening,
    Reading,
    Writing,
}

impl ExamModule {
    pub const ORDERED: [ExamModule; 3] = [
        ExamModule::Listening,
        ExamModule::Reading,
        ExamModule::Writing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamModule::Listening => "listening",
            ExamModule::Reading => "reading",
            ExamModule::Writing => "writing",
        }
    }

    /// The module that has to be finished before this one unlocks.
    pub fn predecessor(&self) -> Option<ExamModule> {
        match self {
            ExamModule::Listening => None,
            ExamModule::Reading => Some(ExamModule::Listening),
            ExamModule::Writing => Some(ExamModule::Reading),
        }
    }

    pub fn successor(&self) -> Option<ExamModule> {
        match self {
            ExamModule::Listening => Some(ExamModule::Reading),
            ExamModule::Reading => Some(ExamModule::Writing),
            ExamModule::Writing => None,
        }
    }
}

impl std::fmt::Display for ExamModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubQuestion {
    pub id: String,
    #[serde(default)]
    pub question_number: Option<u32>,
}

/// A top-level question. When it owns sub-questions the parent itself is
/// never numbered; each sub-question carries its own number.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub question_number: Option<u32>,
    #[serde(default)]
    pub sub_questions: Vec<SubQuestion>,
}

impl Question {
    pub fn numbered(id: &str, number: u32) -> Self {
        Question {
            id: id.to_string(),
            question_number: Some(number),
            sub_questions: Vec::new(),
        }
    }

    pub fn group(id: &str, sub_questions: Vec<SubQuestion>) -> Self {
        Question {
            id: id.to_string(),
            question_number: None,
            sub_questions,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentPart {
    pub id: String,
    pub module_id: String,
    pub module: ExamModule,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}
