use async_graphql::Context;

use crate::{
    auth::claims::{Claims, UserRole},
    errors::{AppError, AppResult},
};

pub fn require_grader(claims: &Claims) -> AppResult<()> {
    if !claims.role.can_grade() {
        return Err(AppError::Forbidden(
            "Only graders can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner_or_admin(claims: &Claims, resource_owner: &str) -> AppResult<()> {
    if claims.role != UserRole::Admin && claims.sub != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_claims_from_context(ctx: &Context<'_>) -> AppResult<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}
