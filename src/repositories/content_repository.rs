use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::content::ContentPart};

/// Read access to the part/question trees owned by the content editor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn find_by_module(&self, module_id: &str) -> AppResult<Vec<ContentPart>>;
    async fn find_by_ids(&self, part_ids: Vec<String>) -> AppResult<Vec<ContentPart>>;
}

pub struct MongoContentRepository {
    collection: Collection<ContentPart>,
}

impl MongoContentRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("content_parts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for content_parts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let module_index = IndexModel::builder()
            .keys(doc! { "module_id": 1, "order": 1 })
            .options(
                IndexOptions::builder()
                    .name("module_order".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(module_index).await?;

        log::info!("Successfully created indexes for content_parts collection");
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for MongoContentRepository {
    async fn find_by_module(&self, module_id: &str) -> AppResult<Vec<ContentPart>> {
        let parts = self
            .collection
            .find(doc! { "module_id": module_id })
            .sort(doc! { "order": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(parts)
    }

    async fn find_by_ids(&self, part_ids: Vec<String>) -> AppResult<Vec<ContentPart>> {
        let mut parts: Vec<ContentPart> = self
            .collection
            .find(doc! { "id": { "$in": part_ids.clone() } })
            .await?
            .try_collect()
            .await?;

        // Keep the caller's order; it defines the test-wide numbering sequence.
        parts.sort_by_key(|part| {
            part_ids
                .iter()
                .position(|id| id == &part.id)
                .unwrap_or(usize::MAX)
        });
        Ok(parts)
    }
}
