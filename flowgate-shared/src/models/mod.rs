/// Entities owned by the identity service and the form engine
///
/// # Models
///
/// - `user`: Identity users with caller-supplied ids
/// - `group`: Groups and user-group memberships
/// - `form_instance`: Submitted form instances
///
/// Persistence for these types lives in [`crate::persistence`]; the structs
/// here are plain data with `sqlx::FromRow` mappings.

pub mod form_instance;
pub mod group;
pub mod user;

pub use form_instance::FormInstance;
pub use group::{Group, Membership};
pub use user::{UpdateUser, User};

/// Maximum length of entity ids, matching the `VARCHAR(64)` key columns
pub const MAX_ID_LENGTH: usize = 64;
