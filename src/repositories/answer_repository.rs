use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, UpdateOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::answer::{ObjectiveAnswer, WritingAnswer},
};

/// Storage boundary for learner answers. Batches are upserts keyed by stable
/// ids, so re-sending the same batch is harmless.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn save_objective_batch(&self, answers: Vec<ObjectiveAnswer>) -> AppResult<usize>;
    async fn save_writing_batch(&self, answers: Vec<WritingAnswer>) -> AppResult<usize>;
    async fn find_objective_by_attempt(&self, attempt_id: &str)
        -> AppResult<Vec<ObjectiveAnswer>>;
    async fn find_writing_by_attempt(&self, attempt_id: &str) -> AppResult<Vec<WritingAnswer>>;
}

pub struct MongoAnswerRepository {
    objective: Collection<ObjectiveAnswer>,
    writing: Collection<WritingAnswer>,
}

impl MongoAnswerRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            objective: db.get_collection("objective_answers"),
            writing: db.get_collection("writing_answers"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for answer collections");

        let objective_key = IndexModel::builder()
            .keys(doc! { "attempt_id": 1, "part_id": 1, "question_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("attempt_part_question_unique".to_string())
                    .build(),
            )
            .build();

        let writing_key = IndexModel::builder()
            .keys(doc! { "attempt_id": 1, "task_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("attempt_task_unique".to_string())
                    .build(),
            )
            .build();

        let writing_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.objective.create_index(objective_key).await?;
        self.writing.create_index(writing_key).await?;
        self.writing.create_index(writing_id).await?;

        log::info!("Successfully created indexes for answer collections");
        Ok(())
    }
}

#[async_trait]
impl AnswerRepository for MongoAnswerRepository {
    async fn save_objective_batch(&self, answers: Vec<ObjectiveAnswer>) -> AppResult<usize> {
        let upsert = UpdateOptions::builder().upsert(true).build();
        let updated_at = bson::DateTime::now();

        for answer in &answers {
            self.objective
                .update_one(
                    doc! {
                        "attempt_id": &answer.attempt_id,
                        "part_id": &answer.part_id,
                        "question_id": &answer.question_id,
                    },
                    doc! {
                        "$set": {
                            "module": answer.module.as_str(),
                            "question_number": answer.question_number as i64,
                            "answer": &answer.answer,
                            "updated_at": updated_at,
                        }
                    },
                )
                .with_options(upsert.clone())
                .await?;
        }

        Ok(answers.len())
    }

    async fn save_writing_batch(&self, answers: Vec<WritingAnswer>) -> AppResult<usize> {
        let upsert = UpdateOptions::builder().upsert(true).build();
        let updated_at = bson::DateTime::now();

        for answer in &answers {
            self.writing
                .update_one(
                    doc! {
                        "attempt_id": &answer.attempt_id,
                        "task_id": &answer.task_id,
                    },
                    doc! {
                        "$set": {
                            "answer_text": &answer.answer_text,
                            "word_count": answer.word_count as i64,
                            "updated_at": updated_at,
                        },
                        "$setOnInsert": { "id": &answer.id },
                    },
                )
                .with_options(upsert.clone())
                .await?;
        }

        Ok(answers.len())
    }

    async fn find_objective_by_attempt(
        &self,
        attempt_id: &str,
    ) -> AppResult<Vec<ObjectiveAnswer>> {
        let answers = self
            .objective
            .find(doc! { "attempt_id": attempt_id })
            .sort(doc! { "question_number": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(answers)
    }

    async fn find_writing_by_attempt(&self, attempt_id: &str) -> AppResult<Vec<WritingAnswer>> {
        let answers = self
            .writing
            .find(doc! { "attempt_id": attempt_id })
            .await?
            .try_collect()
            .await?;
        Ok(answers)
    }
}
