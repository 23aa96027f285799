use validator::Validate;

use crate::{errors::AppResult, models::dto::request::PaginationParams};

/// Runs the input's validator rules, mapping failures to `ValidationError`.
pub fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    input.validate()?;
    Ok(())
}

/// Offset/limit with the API's defaults and bounds applied.
pub fn page(offset: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let params = PaginationParams::new(offset, limit);
    (params.offset(), params.limit())
}
