use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::attempt::{Attempt, AttemptScope, AttemptStatus, ScopeKind},
    repositories::AttemptRepository,
};

/// Opens attempts and moves them into their terminal states.
///
/// The service never deduplicates `create`: opening one attempt per rendered
/// session is the caller's job (see `ModuleSession::begin`).
pub struct AttemptService {
    repository: Arc<dyn AttemptRepository>,
}

impl AttemptService {
    pub fn new(repository: Arc<dyn AttemptRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        user_id: &str,
        scope: ScopeKind,
        entity_id: &str,
    ) -> AppResult<Attempt> {
        if user_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "attempt requires an owning user".to_string(),
            ));
        }

        let scope = AttemptScope::new(scope, entity_id)?;
        let attempt = self
            .repository
            .create(Attempt::start(user_id, scope))
            .await?;

        log::info!(
            "Opened attempt {} for user {} on {} {}",
            attempt.id,
            attempt.user_id,
            attempt.scope.kind().as_str(),
            attempt.scope.entity_id()
        );
        Ok(attempt)
    }

    pub async fn get_owned(&self, user_id: &str, attempt_id: &str) -> AppResult<Attempt> {
        let attempt = self
            .repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))?;

        if attempt.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only access your own attempts".to_string(),
            ));
        }

        Ok(attempt)
    }

    pub async fn submit(&self, user_id: &str, attempt_id: &str) -> AppResult<Attempt> {
        self.transition(user_id, attempt_id, AttemptStatus::Submitted)
            .await
    }

    pub async fn abandon(&self, user_id: &str, attempt_id: &str) -> AppResult<Attempt> {
        self.transition(user_id, attempt_id, AttemptStatus::Abandoned)
            .await
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Attempt>, i64)> {
        self.repository.list_by_user(user_id, offset, limit).await
    }

    async fn transition(
        &self,
        user_id: &str,
        attempt_id: &str,
        to: AttemptStatus,
    ) -> AppResult<Attempt> {
        let current = self.get_owned(user_id, attempt_id).await?;

        let finished_at = Utc::now();
        // Validates the transition before touching storage.
        current.finish(to, finished_at)?;

        let updated = self
            .repository
            .finish(attempt_id, to, finished_at)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Attempt '{}' is no longer in progress",
                    attempt_id
                ))
            })?;

        log::info!("Attempt {} is now {}", updated.id, updated.status);
        Ok(updated)
    }
}
