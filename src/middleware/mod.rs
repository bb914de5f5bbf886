pub mod auth;
pub mod guards;
pub mod response;
pub mod validate;

pub use auth::{authenticate_jwt, AuthUser};
pub use guards::{ensure_admin, ensure_admin_or_owner, ensure_logged_in};
pub use response::{ApiResponse, ApiResult};
pub use validate::{ApiPath, ValidatedJson, ValidatedQuery};
