use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_grader},
    graphql::helpers::{page, validate_input},
    models::{
        domain::content::ExamModule,
        dto::{
            request::BandScoresInput,
            response::{
                AttemptDto, BandDto, MockExamDto, ModuleEntryDto, PaginatedAttempts,
                PaginatedWritingAnswers, PaginationMetadata, QuestionMapDto, WritingAnswerDto,
            },
        },
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn attempt(&self, ctx: &Context<'_>, id: ID) -> Result<AttemptDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        let attempt = state
            .attempt_service
            .get_owned(&claims.sub, &id)
            .await
            .extend()?;

        Ok(attempt.into())
    }

    /// The caller's attempts, newest first.
    async fn my_attempts(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PaginatedAttempts> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        let (offset, limit) = page(offset, limit);

        let (attempts, total) = state
            .attempt_service
            .list_for_user(&claims.sub, offset, limit)
            .await
            .extend()?;

        Ok(PaginatedAttempts {
            items: attempts.into_iter().map(AttemptDto::from).collect(),
            pagination: PaginationMetadata::new(offset, limit, total),
        })
    }

    async fn mock_exam(&self, ctx: &Context<'_>, id: ID) -> Result<MockExamDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        let exam = state
            .module_sequencer
            .load_exam(&claims.sub, &id)
            .await
            .extend()?;

        Ok(exam.into())
    }

    async fn enter_module(
        &self,
        ctx: &Context<'_>,
        exam_id: ID,
        module: ExamModule,
    ) -> Result<ModuleEntryDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        let entry = state
            .module_sequencer
            .enter(&claims.sub, &exam_id, module)
            .await
            .extend()?;

        Ok(entry.into())
    }

    /// Question number to question id, per part, in the order requested.
    async fn question_map(
        &self,
        ctx: &Context<'_>,
        part_ids: Vec<String>,
    ) -> Result<Vec<QuestionMapDto>> {
        let state = ctx.data::<AppState>()?;
        extract_claims_from_context(ctx).extend()?;

        let maps = state
            .answer_service
            .question_map(part_ids)
            .await
            .extend()?;

        Ok(maps.into_iter().map(QuestionMapDto::from).collect())
    }

    /// Period, in seconds, at which learner clients autosave their drafts.
    async fn autosave_interval_secs(&self, ctx: &Context<'_>) -> Result<i64> {
        let state = ctx.data::<AppState>()?;
        extract_claims_from_context(ctx).extend()?;

        Ok(state.config.autosave_interval().as_secs() as i64)
    }

    async fn grading_queue(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PaginatedWritingAnswers> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;
        require_grader(&claims).extend()?;

        let (offset, limit) = page(offset, limit);

        let (answers, total) = state
            .grading_service
            .grading_queue(offset, limit)
            .await
            .extend()?;

        Ok(PaginatedWritingAnswers {
            items: answers.into_iter().map(WritingAnswerDto::from).collect(),
            pagination: PaginationMetadata::new(offset, limit, total),
        })
    }

    async fn band_preview(&self, ctx: &Context<'_>, scores: BandScoresInput) -> Result<BandDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;
        require_grader(&claims).extend()?;

        validate_input(&scores).extend()?;

        Ok(state.grading_service.preview_band(&scores.into()).into())
    }
}
