use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        answer::{AnswerMap, EssayMap, ObjectiveModule},
        attempt::{Attempt, ScopeKind},
    },
    services::{
        answer_service::{AnswerService, SaveOutcome},
        attempt_service::AttemptService,
        autosave::{AutosaveTask, DraftSaver},
        question_identity::PartQuestionMap,
    },
};

/// What kind of answers the session collects.
#[derive(Clone, Debug)]
pub enum SessionKind {
    Objective {
        module: ObjectiveModule,
        mappings: Vec<PartQuestionMap>,
    },
    Writing,
}

#[derive(Clone, Debug, Default)]
struct Draft {
    answers: AnswerMap,
    essays: EssayMap,
}

struct SaveContext {
    answers: Arc<AnswerService>,
    attempt_id: String,
    kind: SessionKind,
    draft: Arc<Mutex<Draft>>,
}

#[async_trait]
impl DraftSaver for SaveContext {
    async fn save_draft(&self) -> AppResult<SaveOutcome> {
        let draft = self.draft.lock().await.clone();

        match &self.kind {
            SessionKind::Objective { module, mappings } => {
                self.answers
                    .save_objective(&self.attempt_id, *module, &draft.answers, mappings)
                    .await
            }
            SessionKind::Writing => self.answers.save_writing(&self.attempt_id, &draft.essays).await,
        }
    }
}

/// A learner working through one module, part or task.
///
/// Holds the attempt handle returned by `begin` and the full local answer
/// draft. Saving never clears the draft, so every save re-sends everything
/// answered so far.
pub struct ModuleSession {
    attempts: Arc<AttemptService>,
    answers: Arc<AnswerService>,
    user_id: String,
    scope: ScopeKind,
    entity_id: String,
    kind: SessionKind,
    draft: Arc<Mutex<Draft>>,
    created: bool,
    attempt: Option<Attempt>,
    saver: Option<Arc<SaveContext>>,
    autosave: Option<AutosaveTask>,
    autosave_period: Option<Duration>,
}

impl ModuleSession {
    pub fn new(
        attempts: Arc<AttemptService>,
        answers: Arc<AnswerService>,
        user_id: &str,
        scope: ScopeKind,
        entity_id: &str,
        kind: SessionKind,
    ) -> Self {
        Self {
            attempts,
            answers,
            user_id: user_id.to_string(),
            scope,
            entity_id: entity_id.to_string(),
            kind,
            draft: Arc::new(Mutex::new(Draft::default())),
            created: false,
            attempt: None,
            saver: None,
            autosave: None,
            autosave_period: None,
        }
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    /// Opens the session's attempt once. Later calls hand back the same
    /// attempt without touching storage; a failed create may be retried.
    pub async fn begin(&mut self) -> AppResult<Attempt> {
        if let Some(attempt) = &self.attempt {
            return Ok(attempt.clone());
        }

        if self.created {
            return Err(AppError::InvalidState(
                "attempt creation was interrupted; reload the session".to_string(),
            ));
        }
        self.created = true;

        let attempt = match self
            .attempts
            .create(&self.user_id, self.scope, &self.entity_id)
            .await
        {
            Ok(attempt) => attempt,
            Err(err) => {
                self.created = false;
                return Err(err);
            }
        };

        self.saver = Some(Arc::new(SaveContext {
            answers: self.answers.clone(),
            attempt_id: attempt.id.clone(),
            kind: self.kind.clone(),
            draft: self.draft.clone(),
        }));
        self.attempt = Some(attempt.clone());
        Ok(attempt)
    }

    pub async fn record_answer(&self, question_number: u32, value: impl Into<String>) {
        self.draft
            .lock()
            .await
            .answers
            .insert(question_number, value.into());
    }

    pub async fn record_essay(&self, task_id: &str, text: impl Into<String>) {
        self.draft
            .lock()
            .await
            .essays
            .insert(task_id.to_string(), text.into());
    }

    /// Pushes the whole draft. Before `begin` has produced an attempt this is
    /// skipped.
    pub async fn save(&self) -> AppResult<SaveOutcome> {
        match &self.saver {
            Some(saver) => saver.save_draft().await,
            None => Ok(SaveOutcome::Skipped),
        }
    }

    /// Starts periodic saving for the open attempt. Returns `false` when there
    /// is no open attempt to save into.
    pub fn start_autosave(&mut self, period: Duration) -> bool {
        let Some(saver) = self.saver.clone() else {
            return false;
        };
        if !self.attempt.as_ref().map(Attempt::is_open).unwrap_or(false) {
            return false;
        }

        if !self.autosave_running() {
            self.autosave = Some(AutosaveTask::spawn(period, saver));
            self.autosave_period = Some(period);
        }
        true
    }

    pub fn autosave_running(&self) -> bool {
        self.autosave
            .as_ref()
            .map(AutosaveTask::is_running)
            .unwrap_or(false)
    }

    pub fn stop_autosave(&mut self) {
        self.halt_autosave();
        self.autosave_period = None;
    }

    /// Final save, then submit. If either fails the attempt stays in progress,
    /// autosave resumes and the error is returned so the learner can retry.
    pub async fn finish(&mut self) -> AppResult<Attempt> {
        let attempt_id = self.open_attempt_id()?;
        let resume = self.halt_autosave();

        let submitted = match self.save_and_submit(&attempt_id).await {
            Ok(submitted) => submitted,
            Err(err) => {
                self.resume_autosave(resume);
                return Err(err);
            }
        };

        self.autosave_period = None;
        self.attempt = Some(submitted.clone());
        Ok(submitted)
    }

    pub async fn abandon(&mut self) -> AppResult<Attempt> {
        let attempt_id = self.open_attempt_id()?;
        let resume = self.halt_autosave();

        let abandoned = match self.attempts.abandon(&self.user_id, &attempt_id).await {
            Ok(abandoned) => abandoned,
            Err(err) => {
                self.resume_autosave(resume);
                return Err(err);
            }
        };

        self.autosave_period = None;
        self.attempt = Some(abandoned.clone());
        Ok(abandoned)
    }

    async fn save_and_submit(&self, attempt_id: &str) -> AppResult<Attempt> {
        self.save().await?;
        self.attempts.submit(&self.user_id, attempt_id).await
    }

    /// Stops the running task, returning its period if one was running.
    fn halt_autosave(&mut self) -> Option<Duration> {
        let mut task = self.autosave.take()?;
        let running = task.is_running();
        task.stop();
        self.autosave_period.filter(|_| running)
    }

    fn resume_autosave(&mut self, period: Option<Duration>) {
        if let Some(period) = period {
            log::debug!("Resuming autosave after a failed terminal transition");
            self.start_autosave(period);
        }
    }

    fn open_attempt_id(&self) -> AppResult<String> {
        self.attempt
            .as_ref()
            .map(|attempt| attempt.id.clone())
            .ok_or_else(|| AppError::InvalidState("no attempt has been started".to_string()))
    }
}
