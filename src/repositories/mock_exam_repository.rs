use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{content::ExamModule, mock_exam::MockExam, ModuleFlags},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MockExamRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<MockExam>>;
    /// Sets the module's completion flag to `true`. Never clears a flag.
    async fn mark_module_finished(&self, id: &str, module: ExamModule) -> AppResult<()>;
}

pub struct MongoMockExamRepository {
    collection: Collection<MockExam>,
}

impl MongoMockExamRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("mock_exams");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for mock_exams collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        log::info!("Successfully created indexes for mock_exams collection");
        Ok(())
    }
}

#[async_trait]
impl MockExamRepository for MongoMockExamRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<MockExam>> {
        let exam = self.collection.find_one(doc! { "id": id }).await?;
        Ok(exam)
    }

    async fn mark_module_finished(&self, id: &str, module: ExamModule) -> AppResult<()> {
        let field = ModuleFlags::flag_field(module);
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$set": { field: true } })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Mock exam with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
