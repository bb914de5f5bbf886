pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyFilter, CompanyPatch, NewCompany};
pub use job::{Job, JobFilter, JobPatch, NewJob};
pub use user::{Credentials, NewUser, RegisterUser, User, UserPatch};

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// in partial-update bodies. Use with `#[serde(default)]`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Record a failed check on `field` for hand-written `Validate` impls
pub(crate) fn reject(
    errors: &mut validator::ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: &'static str,
) {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(std::borrow::Cow::Borrowed(message));
    errors.add(field, error);
}
