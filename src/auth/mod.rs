pub mod claims;
pub mod jwt;
pub mod utils;

pub use claims::{Claims, UserRole};
pub use jwt::JwtService;
pub use utils::{extract_claims_from_context, require_grader, require_owner_or_admin};
