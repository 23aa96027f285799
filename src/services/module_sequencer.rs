use std::sync::Arc;

use serde::Serialize;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        attempt::{Attempt, AttemptScope},
        content::ExamModule,
        mock_exam::{MockExam, ModuleFlags},
    },
    repositories::MockExamRepository,
    services::{attempt_service::AttemptService, module_session::ModuleSession},
};

/// Outcome of persisting a module completion flag.
///
/// Advisory: a failed write never undoes a completed module, so this is
/// reported alongside the result instead of as an error.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FlagWrite {
    Recorded,
    /// The stored flag was already set; nothing was written.
    AlreadySet,
    Failed { reason: String },
}

impl FlagWrite {
    pub fn is_persisted(&self) -> bool {
        !matches!(self, FlagWrite::Failed { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            FlagWrite::Failed { reason } => Some(reason),
            FlagWrite::Recorded | FlagWrite::AlreadySet => None,
        }
    }
}

/// Resolved target of entering one module of a mock exam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleEntry {
    pub exam_id: String,
    pub test_id: String,
    pub module: ExamModule,
    pub module_id: String,
}

#[derive(Clone, Debug)]
pub struct ModuleFinish {
    pub module: ExamModule,
    /// Present when the module tracked answers under an attempt.
    pub attempt: Option<Attempt>,
    pub flag: FlagWrite,
    pub next_module: Option<ExamModule>,
}

/// Refuses locked modules, resolves module ids.
pub fn check_entry(exam: &MockExam, flags: &ModuleFlags, module: ExamModule) -> AppResult<ModuleEntry> {
    if !flags.is_unlocked(module) {
        let previous = module
            .predecessor()
            .map(|previous| previous.as_str())
            .unwrap_or("previous");
        return Err(AppError::ModuleLocked(format!(
            "Finish the {} module before starting {}",
            previous,
            module.as_str()
        )));
    }

    let module_id = exam
        .module_id(module)
        .ok_or_else(|| AppError::NotFound("no module found for this exam".to_string()))?;

    Ok(ModuleEntry {
        exam_id: exam.id.clone(),
        test_id: exam.test_id.clone(),
        module,
        module_id: module_id.to_string(),
    })
}

/// Enforces Listening → Reading → Writing across a learner's mock exam.
pub struct ModuleSequencer {
    exams: Arc<dyn MockExamRepository>,
    attempts: Arc<AttemptService>,
}

impl ModuleSequencer {
    pub fn new(exams: Arc<dyn MockExamRepository>, attempts: Arc<AttemptService>) -> Self {
        Self { exams, attempts }
    }

    pub async fn load_exam(&self, user_id: &str, exam_id: &str) -> AppResult<MockExam> {
        let exam = self
            .exams
            .find_by_id(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Mock exam '{}' not found", exam_id)))?;

        if exam.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only access your own mock exams".to_string(),
            ));
        }

        Ok(exam)
    }

    pub async fn enter(
        &self,
        user_id: &str,
        exam_id: &str,
        module: ExamModule,
    ) -> AppResult<ModuleEntry> {
        let exam = self.load_exam(user_id, exam_id).await?;
        check_entry(&exam, &exam.flags, module)
    }

    pub async fn record_completion(&self, exam_id: &str, module: ExamModule) -> FlagWrite {
        match self.exams.mark_module_finished(exam_id, module).await {
            Ok(()) => {
                log::info!("Recorded {} completion for mock exam {}", module, exam_id);
                FlagWrite::Recorded
            }
            Err(err) => {
                log::warn!(
                    "Could not record {} completion for mock exam {}: {}",
                    module,
                    exam_id,
                    err
                );
                FlagWrite::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Submits the module's attempt when there is one, then records the flag.
    /// Locked modules are refused before anything is written, and a failed
    /// submit leaves the flag untouched. A module whose stored flag is still
    /// unset may be finished again to retry the flag write.
    pub async fn finish_module(
        &self,
        user_id: &str,
        exam_id: &str,
        module: ExamModule,
        attempt_id: Option<&str>,
    ) -> AppResult<ModuleFinish> {
        let exam = self.load_exam(user_id, exam_id).await?;
        let entry = check_entry(&exam, &exam.flags, module)?;

        let attempt = match attempt_id {
            Some(id) => {
                let current = self.attempts.get_owned(user_id, id).await?;
                ensure_covers_module(&current, &exam, &entry)?;
                Some(self.attempts.submit(user_id, id).await?)
            }
            None => None,
        };

        let flag = if exam.flags.is_finished(module) {
            FlagWrite::AlreadySet
        } else {
            self.record_completion(exam_id, module).await
        };

        Ok(ModuleFinish {
            module,
            attempt,
            flag,
            next_module: module.successor(),
        })
    }
}

/// An attempt finishes a module only if it was opened on that module or on
/// the exam's whole test.
fn ensure_covers_module(attempt: &Attempt, exam: &MockExam, entry: &ModuleEntry) -> AppResult<()> {
    let covers = match &attempt.scope {
        AttemptScope::Module { module_id } => module_id == &entry.module_id,
        AttemptScope::Test { test_id } => test_id == &exam.test_id,
        AttemptScope::Part { .. } | AttemptScope::Task { .. } => false,
    };

    if !covers {
        return Err(AppError::ValidationError(format!(
            "Attempt '{}' does not belong to the {} module of this exam",
            attempt.id, entry.module
        )));
    }
    Ok(())
}

/// Learner-side view of a mock exam. Keeps its own copy of the flags so a
/// completed module unlocks the next one even when the stored flag write
/// failed.
pub struct ExamNavigator {
    sequencer: Arc<ModuleSequencer>,
    exam: MockExam,
}

impl ExamNavigator {
    pub async fn open(
        sequencer: Arc<ModuleSequencer>,
        user_id: &str,
        exam_id: &str,
    ) -> AppResult<Self> {
        let exam = sequencer.load_exam(user_id, exam_id).await?;
        Ok(Self { sequencer, exam })
    }

    pub fn flags(&self) -> ModuleFlags {
        self.exam.flags
    }

    pub fn can_enter(&self, module: ExamModule) -> bool {
        self.exam.flags.is_unlocked(module)
    }

    pub fn enter(&self, module: ExamModule) -> AppResult<ModuleEntry> {
        check_entry(&self.exam, &self.exam.flags, module)
    }

    pub async fn finish(
        &mut self,
        module: ExamModule,
        session: Option<&mut ModuleSession>,
    ) -> AppResult<ModuleFinish> {
        check_entry(&self.exam, &self.exam.flags, module)?;

        let attempt = match session {
            Some(session) if session.attempt().is_some() => Some(session.finish().await?),
            _ => None,
        };

        let flag = if self.exam.flags.is_finished(module) {
            FlagWrite::AlreadySet
        } else {
            self.exam.flags.mark_finished(module);
            self.sequencer.record_completion(&self.exam.id, module).await
        };

        Ok(ModuleFinish {
            module,
            attempt,
            flag,
            next_module: module.successor(),
        })
    }
}
