use std::collections::BTreeMap;

use async_graphql::Enum;
use bson::serde_helpers::chrono_datetime_as_bson_datetime_optional;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{content::ExamModule, grade::WritingGrade};

/// Raw learner answers keyed by test-wide question number.
pub type AnswerMap = BTreeMap<u32, String>;

/// Raw essays keyed by writing task id.
pub type EssayMap = BTreeMap<String, String>;

/// Modules whose answers are numbered items resolved through the question map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveModule {
    Listening,
    Reading,
}

impl ObjectiveModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveModule::Listening => "listening",
            ObjectiveModule::Reading => "reading",
        }
    }
}

impl From<ObjectiveModule> for ExamModule {
    fn from(module: ObjectiveModule) -> Self {
        match module {
            ObjectiveModule::Listening => ExamModule::Listening,
            ObjectiveModule::Reading => ExamModule::Reading,
        }
    }
}

/// One answered numbered item of a reading or listening attempt.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectiveAnswer {
    pub attempt_id: String,
    pub module: ObjectiveModule,
    pub part_id: String,
    pub question_id: String,
    pub question_number: u32,
    pub answer: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono_datetime_as_bson_datetime_optional"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One essay of a writing attempt. `grade` is only ever written by grading.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WritingAnswer {
    pub id: String,
    pub attempt_id: String,
    pub task_id: String,
    pub answer_text: String,
    pub word_count: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono_datetime_as_bson_datetime_optional"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<WritingGrade>,
}

/// Count of whitespace-delimited, non-empty tokens.
pub fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
