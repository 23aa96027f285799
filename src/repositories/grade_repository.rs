use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, from_document, to_bson, Bson, Document},
    Collection,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{answer::WritingAnswer, attempt::AttemptStatus, grade::WritingGrade},
};

/// The grading actor's view of submitted essays.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradeRepository: Send + Sync {
    /// Ungraded essays whose attempt is `SUBMITTED`, oldest first. `total`
    /// counts the same set.
    async fn find_ungraded(&self, offset: i64, limit: i64) -> AppResult<(Vec<WritingAnswer>, i64)>;
    async fn find_answer(&self, answer_id: &str) -> AppResult<Option<WritingAnswer>>;
    async fn save_grade(&self, answer_id: &str, grade: WritingGrade) -> AppResult<WritingAnswer>;
}

/// Ungraded essays joined to their attempt, kept only when it was submitted.
fn gradable_stages() -> Vec<Document> {
    vec![
        doc! { "$match": { "grade": { "$exists": false } } },
        doc! {
            "$lookup": {
                "from": "attempts",
                "localField": "attempt_id",
                "foreignField": "id",
                "as": "attempt",
            }
        },
        doc! { "$match": { "attempt.status": AttemptStatus::Submitted.as_str() } },
    ]
}

pub struct MongoGradeRepository {
    collection: Collection<WritingAnswer>,
}

impl MongoGradeRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("writing_answers");
        Self { collection }
    }
}

#[async_trait]
impl GradeRepository for MongoGradeRepository {
    async fn find_ungraded(&self, offset: i64, limit: i64) -> AppResult<(Vec<WritingAnswer>, i64)> {
        let mut count_pipeline = gradable_stages();
        count_pipeline.push(doc! { "$count": "total" });

        let total = match self.collection.aggregate(count_pipeline).await?.try_next().await? {
            Some(counted) => match counted.get("total") {
                Some(Bson::Int32(total)) => *total as i64,
                Some(Bson::Int64(total)) => *total,
                _ => 0,
            },
            None => 0,
        };

        let mut page_pipeline = gradable_stages();
        page_pipeline.extend([
            doc! { "$sort": { "updated_at": 1, "id": 1 } },
            doc! { "$skip": offset.max(0) },
            doc! { "$limit": limit.max(1) },
            doc! { "$project": { "attempt": 0 } },
        ]);

        let documents: Vec<Document> = self
            .collection
            .aggregate(page_pipeline)
            .await?
            .try_collect()
            .await?;

        let answers = documents
            .into_iter()
            .map(from_document::<WritingAnswer>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((answers, total))
    }

    async fn find_answer(&self, answer_id: &str) -> AppResult<Option<WritingAnswer>> {
        let answer = self.collection.find_one(doc! { "id": answer_id }).await?;
        Ok(answer)
    }

    async fn save_grade(&self, answer_id: &str, grade: WritingGrade) -> AppResult<WritingAnswer> {
        let grade = to_bson(&grade)?;

        self.collection
            .update_one(doc! { "id": answer_id }, doc! { "$set": { "grade": grade } })
            .await?;

        self.find_answer(answer_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "Writing answer with id '{}' not found",
                answer_id
            ))
        })
    }
}
