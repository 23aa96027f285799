use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    app_state::AppState,
    auth::{extract_claims_from_context, require_grader, Claims},
    errors::{AppError, AppResult},
    graphql::helpers::validate_input,
    models::{
        domain::{answer::ObjectiveModule, attempt::Attempt},
        dto::{
            request::{
                FinishModuleInput, SaveObjectiveAnswersInput, SaveWritingAnswersInput,
                StartAttemptInput, SubmitGradeInput,
            },
            response::{AttemptDto, ModuleFinishDto, SaveResultDto, WritingAnswerDto},
        },
    },
};

pub struct MutationRoot;

/// Answers may only be written into the caller's own, still open attempt.
async fn open_attempt(state: &AppState, claims: &Claims, attempt_id: &str) -> AppResult<Attempt> {
    let attempt = state
        .attempt_service
        .get_owned(&claims.sub, attempt_id)
        .await?;

    if !attempt.is_open() {
        return Err(AppError::InvalidState(format!(
            "Attempt '{}' is already {}",
            attempt_id, attempt.status
        )));
    }
    Ok(attempt)
}

async fn save_objective(
    ctx: &Context<'_>,
    module: ObjectiveModule,
    input: SaveObjectiveAnswersInput,
) -> Result<SaveResultDto> {
    let state = ctx.data::<AppState>()?;
    let claims = extract_claims_from_context(ctx).extend()?;

    validate_input(&input).extend()?;
    let attempt = open_attempt(state, &claims, &input.attempt_id)
        .await
        .extend()?;

    let answers = input.answer_map();
    let outcome = state
        .answer_service
        .save_objective_for_parts(&attempt, module, input.part_ids, &answers)
        .await
        .extend()?;

    Ok(outcome.into())
}

#[Object]
impl MutationRoot {
    async fn start_attempt(&self, ctx: &Context<'_>, input: StartAttemptInput) -> Result<AttemptDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        validate_input(&input).extend()?;

        let attempt = state
            .attempt_service
            .create(&claims.sub, input.scope, &input.entity_id)
            .await
            .extend()?;

        Ok(attempt.into())
    }

    async fn submit_attempt(&self, ctx: &Context<'_>, id: ID) -> Result<AttemptDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        let attempt = state
            .attempt_service
            .submit(&claims.sub, &id)
            .await
            .extend()?;

        Ok(attempt.into())
    }

    async fn abandon_attempt(&self, ctx: &Context<'_>, id: ID) -> Result<AttemptDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        let attempt = state
            .attempt_service
            .abandon(&claims.sub, &id)
            .await
            .extend()?;

        Ok(attempt.into())
    }

    async fn save_reading_answers(
        &self,
        ctx: &Context<'_>,
        input: SaveObjectiveAnswersInput,
    ) -> Result<SaveResultDto> {
        save_objective(ctx, ObjectiveModule::Reading, input).await
    }

    async fn save_listening_answers(
        &self,
        ctx: &Context<'_>,
        input: SaveObjectiveAnswersInput,
    ) -> Result<SaveResultDto> {
        save_objective(ctx, ObjectiveModule::Listening, input).await
    }

    async fn save_writing_answers(
        &self,
        ctx: &Context<'_>,
        input: SaveWritingAnswersInput,
    ) -> Result<SaveResultDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        validate_input(&input).extend()?;
        open_attempt(state, &claims, &input.attempt_id)
            .await
            .extend()?;

        let outcome = state
            .answer_service
            .save_writing(&input.attempt_id, &input.essay_map())
            .await
            .extend()?;

        Ok(outcome.into())
    }

    /// Submits the module's attempt, then records the completion flag. A flag
    /// write failure is reported in the payload, not as an error.
    async fn finish_module(
        &self,
        ctx: &Context<'_>,
        input: FinishModuleInput,
    ) -> Result<ModuleFinishDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;

        validate_input(&input).extend()?;

        let finish = state
            .module_sequencer
            .finish_module(
                &claims.sub,
                &input.exam_id,
                input.module,
                input.attempt_id.as_deref(),
            )
            .await
            .extend()?;

        Ok(finish.into())
    }

    async fn submit_grade(
        &self,
        ctx: &Context<'_>,
        input: SubmitGradeInput,
    ) -> Result<WritingAnswerDto> {
        let state = ctx.data::<AppState>()?;
        let claims = extract_claims_from_context(ctx).extend()?;
        require_grader(&claims).extend()?;

        validate_input(&input).extend()?;

        let graded = state
            .grading_service
            .submit_grade(
                &claims.sub,
                &input.answer_id,
                input.scores.into(),
                input.feedback.unwrap_or_default(),
            )
            .await
            .extend()?;

        Ok(graded.into())
    }
}
