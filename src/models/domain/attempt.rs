use async_graphql::Enum;
use bson::serde_helpers::{
    chrono_datetime_as_bson_datetime, chrono_datetime_as_bson_datetime_optional,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Granularity of content an attempt covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeKind {
    Test,
    Module,
    Part,
    Task,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Test => "TEST",
            ScopeKind::Module => "MODULE",
            ScopeKind::Part => "PART",
            ScopeKind::Task => "TASK",
        }
    }
}

impl std::str::FromStr for ScopeKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "TEST" => Ok(ScopeKind::Test),
            "MODULE" => Ok(ScopeKind::Module),
            "PART" => Ok(ScopeKind::Part),
            "TASK" => Ok(ScopeKind::Task),
            other => Err(AppError::ValidationError(format!(
                "unknown attempt scope '{}'",
                other
            ))),
        }
    }
}

/// The content an attempt is bound to. Stored flattened, so a document only
/// ever carries the one foreign key that matches its `scope`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "scope", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptScope {
    Test { test_id: String },
    Module { module_id: String },
    Part { part_id: String },
    Task { task_id: String },
}

impl AttemptScope {
    pub fn new(kind: ScopeKind, entity_id: &str) -> AppResult<Self> {
        let entity_id = entity_id.trim();
        if entity_id.is_empty() {
            return Err(AppError::ValidationError(format!(
                "{} attempt requires an entity id",
                kind.as_str()
            )));
        }

        let entity_id = entity_id.to_string();
        Ok(match kind {
            ScopeKind::Test => AttemptScope::Test { test_id: entity_id },
            ScopeKind::Module => AttemptScope::Module {
                module_id: entity_id,
            },
            ScopeKind::Part => AttemptScope::Part { part_id: entity_id },
            ScopeKind::Task => AttemptScope::Task { task_id: entity_id },
        })
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            AttemptScope::Test { .. } => ScopeKind::Test,
            AttemptScope::Module { .. } => ScopeKind::Module,
            AttemptScope::Part { .. } => ScopeKind::Part,
            AttemptScope::Task { .. } => ScopeKind::Task,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            AttemptScope::Test { test_id } => test_id,
            AttemptScope::Module { module_id } => module_id,
            AttemptScope::Part { part_id } => part_id,
            AttemptScope::Task { task_id } => task_id,
        }
    }

    /// Name of the stored foreign key field for this scope.
    pub fn key_field(&self) -> &'static str {
        match self {
            AttemptScope::Test { .. } => "test_id",
            AttemptScope::Module { .. } => "module_id",
            AttemptScope::Part { .. } => "part_id",
            AttemptScope::Task { .. } => "task_id",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Abandoned,
}

impl AttemptStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "IN_PROGRESS",
            AttemptStatus::Submitted => "SUBMITTED",
            AttemptStatus::Abandoned => "ABANDONED",
        }
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attempt {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub scope: AttemptScope,
    pub status: AttemptStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub started_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono_datetime_as_bson_datetime_optional"
    )]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn start(user_id: &str, scope: AttemptScope) -> Self {
        Attempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            scope,
            status: AttemptStatus::InProgress,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    /// Moves an open attempt into a terminal state, stamping `finished_at`.
    pub fn finish(&self, to: AttemptStatus, at: DateTime<Utc>) -> AppResult<Attempt> {
        if !to.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "attempt '{}' cannot transition to {}",
                self.id, to
            )));
        }

        if self.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "attempt '{}' is already {}",
                self.id, self.status
            )));
        }

        Ok(Attempt {
            status: to,
            finished_at: Some(at),
            ..self.clone()
        })
    }
}
