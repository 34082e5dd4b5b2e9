//! Request handlers. Each validates its input, makes one call into the
//! persistence service and maps the result to a view model.

pub mod todo;
pub mod user;

use uuid::Uuid;

use crate::error::AppError;

/// Ids that are not UUIDs cannot name a stored record, so they are reported
/// as not found rather than malformed.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("{raw} Not found")))
}
