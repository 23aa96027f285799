use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::attempt::{Attempt, AttemptStatus},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>>;
    /// Moves the attempt to `status` only if it is still `IN_PROGRESS`.
    /// Returns `None` when no open attempt with that id exists.
    async fn finish(
        &self,
        id: &str,
        status: AttemptStatus,
        finished_at: DateTime<Utc>,
    ) -> AppResult<Option<Attempt>>;
    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Attempt>, i64)>;
}

pub struct MongoAttemptRepository {
    collection: Collection<Attempt>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_started_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "started_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_started".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_started_index).await?;

        log::info!("Successfully created indexes for attempts collection");
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn finish(
        &self,
        id: &str,
        status: AttemptStatus,
        finished_at: DateTime<Utc>,
    ) -> AppResult<Option<Attempt>> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id, "status": AttemptStatus::InProgress.as_str() },
                doc! {
                    "$set": {
                        "status": status.as_str(),
                        "finished_at": bson::DateTime::from_chrono(finished_at),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Attempt>, i64)> {
        let filter = doc! { "user_id": user_id };

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let attempts = self
            .collection
            .find(filter)
            .sort(doc! { "started_at": -1 })
            .skip(offset.max(0) as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total))
    }
}
