use serde::{Deserialize, Serialize};

use crate::models::domain::content::ExamModule;

/// Per-module completion flags of a mock exam container. Flags only ever move
/// from `false` to `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleFlags {
    #[serde(default)]
    pub listening_finished: bool,
    #[serde(default)]
    pub reading_finished: bool,
    #[serde(default)]
    pub writing_finished: bool,
}

impl ModuleFlags {
    pub fn is_finished(&self, module: ExamModule) -> bool {
        match module {
            ExamModule::Listening => self.listening_finished,
            ExamModule::Reading => self.reading_finished,
            ExamModule::Writing => self.writing_finished,
        }
    }

    pub fn mark_finished(&mut self, module: ExamModule) {
        match module {
            ExamModule::Listening => self.listening_finished = true,
            ExamModule::Reading => self.reading_finished = true,
            ExamModule::Writing => self.writing_finished = true,
        }
    }

    /// Listening is always open; every later module needs its predecessor's flag.
    pub fn is_unlocked(&self, module: ExamModule) -> bool {
        module
            .predecessor()
            .map(|previous| self.is_finished(previous))
            .unwrap_or(true)
    }

    pub fn flag_field(module: ExamModule) -> &'static str {
        match module {
            ExamModule::Listening => "listening_finished",
            ExamModule::Reading => "reading_finished",
            ExamModule::Writing => "writing_finished",
        }
    }
}

/// A learner's mock exam: one test split into its three answerable modules.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MockExam {
    pub id: String,
    pub user_id: String,
    pub test_id: String,
    #[serde(default)]
    pub listening_module_id: Option<String>,
    #[serde(default)]
    pub reading_module_id: Option<String>,
    #[serde(default)]
    pub writing_module_id: Option<String>,
    #[serde(flatten)]
    pub flags: ModuleFlags,
}

impl MockExam {
    pub fn module_id(&self, module: ExamModule) -> Option<&str> {
        match module {
            ExamModule::Listening => self.listening_module_id.as_deref(),
            ExamModule::Reading => self.reading_module_id.as_deref(),
            ExamModule::Writing => self.writing_module_id.as_deref(),
        }
        .filter(|id| !id.trim().is_empty())
    }
}
