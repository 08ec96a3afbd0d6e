use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Ownership guard: pure comparison of a resource's recorded owner against the
/// authenticated caller. A mismatch is Forbidden, never NotFound - the two are
/// distinct points in the error taxonomy.
pub fn authorize_owner(resource_owner: Uuid, identity: &AuthUser) -> Result<(), ApiError> {
    if resource_owner == identity.user_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Forbidden action."))
    }
}
