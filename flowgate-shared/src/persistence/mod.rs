/// Persistence layer
///
/// Data managers read and write entity state. Entity managers are thin
/// façades over a data manager that the rest of the system talks to; they add
/// no caching or transactional behaviour of their own.
///
/// ```text
/// IdentityService ──> UserEntityManager ──────> dyn UserDataManager
///                 └─> GroupEntityManager ─────> dyn GroupDataManager
/// form routes ──────> FormInstanceEntityManager > dyn FormInstanceDataManager
///                                                  ├─ PgStore     (Postgres)
///                                                  └─ MemoryStore (in-process)
/// ```
///
/// # Example
///
/// ```
/// use flowgate_shared::models::FormInstance;
/// use flowgate_shared::persistence::{FormInstanceEntityManager, MemoryStore};
/// use flowgate_shared::query::{FormInstanceQuery, Page};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), flowgate_shared::persistence::PersistenceError> {
/// let manager = FormInstanceEntityManager::new(Arc::new(MemoryStore::new()));
/// manager.insert(&FormInstance::new("leave-request:1")).await?;
///
/// let query = FormInstanceQuery::new().form_definition_id("leave-request:1");
/// assert_eq!(manager.find_form_instance_count_by_query_criteria(&query).await?, 1);
/// let page = manager
///     .find_form_instances_by_query_criteria(&query, Some(Page::new(0, 10)))
///     .await?;
/// assert_eq!(page.len(), 1);
/// # Ok(())
/// # }
/// ```

pub mod entity_manager;
pub mod memory;
pub mod postgres;

pub use entity_manager::{FormInstanceEntityManager, GroupEntityManager, UserEntityManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{FormInstance, Group, User};
use crate::query::{FormInstanceQuery, Page, UserQuery};
use async_trait::async_trait;

/// Persistence error types
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// An entity with the same key already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The entity (or one it references) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence result type alias
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Basic CRUD shared by every data manager
#[async_trait]
pub trait DataManager<E>: Send + Sync
where
    E: Send + Sync + 'static,
{
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<E>>;

    /// Fails with [`PersistenceError::Conflict`] when the id is taken
    async fn insert(&self, entity: &E) -> PersistenceResult<()>;

    /// Fails with [`PersistenceError::NotFound`] when the id is unknown
    async fn update(&self, entity: &E) -> PersistenceResult<()>;

    /// Returns false when there was nothing to delete
    async fn delete(&self, id: &str) -> PersistenceResult<bool>;
}

#[async_trait]
pub trait UserDataManager: DataManager<User> {
    async fn find_user_count_by_query_criteria(&self, query: &UserQuery) -> PersistenceResult<i64>;

    async fn find_users_by_query_criteria(
        &self,
        query: &UserQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<User>>;
}

#[async_trait]
pub trait GroupDataManager: DataManager<Group> {
    /// Fails with `NotFound` if the user or group is missing and `Conflict`
    /// if the membership already exists
    async fn create_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<()>;

    async fn delete_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<bool>;

    /// Groups the user belongs to, ordered by id
    async fn find_groups_for_user(&self, user_id: &str) -> PersistenceResult<Vec<Group>>;
}

#[async_trait]
pub trait FormInstanceDataManager: DataManager<FormInstance> {
    async fn find_form_instance_count_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
    ) -> PersistenceResult<i64>;

    async fn find_form_instances_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<FormInstance>>;
}
