/// Identity service
///
/// Owns users, groups and memberships. All storage goes through the user and
/// group entity managers; the service adds id validation, password hashing
/// and the translation of persistence errors into identity errors.
///
/// # Example
///
/// ```
/// use flowgate_shared::identity::IdentityService;
/// use flowgate_shared::persistence::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), flowgate_shared::identity::IdentityError> {
/// let identity = IdentityService::from_store(Arc::new(MemoryStore::new()));
///
/// let mut user = identity.new_user("kermit")?;
/// user.email = Some("kermit@muppets.com".to_string());
/// identity.save_user(user, Some("secret")).await?;
///
/// let query = identity.create_user_query().user_email("kermit@muppets.com");
/// assert_eq!(identity.count_users(&query).await?, 1);
/// assert!(identity.check_password("kermit", "secret").await?);
/// # Ok(())
/// # }
/// ```
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::models::{Group, UpdateUser, User, MAX_ID_LENGTH};
use crate::persistence::{
    GroupDataManager, GroupEntityManager, PersistenceError, UserDataManager, UserEntityManager,
};
use crate::query::{Page, UserQuery};
use std::sync::Arc;
use tracing::{debug, info};

/// Identity error types
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Caller passed an unusable value (e.g. a blank id)
    #[error("{0}")]
    IllegalArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for IdentityError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Conflict(msg) => IdentityError::Conflict(msg),
            PersistenceError::NotFound(msg) => IdentityError::NotFound(msg),
            other => IdentityError::Persistence(other),
        }
    }
}

/// Identity result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

fn validate_id(kind: &str, id: &str) -> IdentityResult<()> {
    if id.trim().is_empty() {
        return Err(IdentityError::IllegalArgument(format!(
            "{} id cannot be empty",
            kind
        )));
    }
    if id.chars().count() > MAX_ID_LENGTH {
        return Err(IdentityError::IllegalArgument(format!(
            "{} id cannot be longer than {} characters",
            kind, MAX_ID_LENGTH
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct IdentityService {
    users: UserEntityManager,
    groups: GroupEntityManager,
}

impl IdentityService {
    pub fn new(users: UserEntityManager, groups: GroupEntityManager) -> Self {
        Self { users, groups }
    }

    /// Builds the service over one store that holds both users and groups
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserDataManager + GroupDataManager + 'static,
    {
        Self::new(
            UserEntityManager::new(store.clone()),
            GroupEntityManager::new(store),
        )
    }

    pub fn user_entity_manager(&self) -> &UserEntityManager {
        &self.users
    }

    pub fn group_entity_manager(&self) -> &GroupEntityManager {
        &self.groups
    }

    pub fn create_user_query(&self) -> UserQuery {
        UserQuery::new()
    }

    pub async fn count_users(&self, query: &UserQuery) -> IdentityResult<i64> {
        Ok(self.users.find_user_count_by_query_criteria(query).await?)
    }

    pub async fn list_users(&self, query: &UserQuery, page: Option<Page>) -> IdentityResult<Vec<User>> {
        Ok(self.users.find_users_by_query_criteria(query, page).await?)
    }

    /// Returns an unsaved user; nothing is persisted until [`save_user`](Self::save_user)
    pub fn new_user(&self, id: &str) -> IdentityResult<User> {
        validate_id("User", id)?;
        Ok(User::new(id))
    }

    /// Inserts the user, or updates it when the id already exists
    ///
    /// `password` is hashed before it is stored; `None` keeps the current
    /// hash (or none, for a new user).
    pub async fn save_user(&self, mut user: User, password: Option<&str>) -> IdentityResult<User> {
        validate_id("User", &user.id)?;

        if let Some(password) = password {
            user.password_hash = Some(hash_password(password)?);
        }

        match self.users.find_by_id(&user.id).await? {
            Some(existing) => {
                if password.is_none() {
                    user.password_hash = existing.password_hash;
                }
                user.created_at = existing.created_at;
                user.updated_at = chrono::Utc::now();
                self.users.update(&user).await?;
                debug!(user_id = %user.id, "Updated user");
            }
            None => {
                self.users.insert(&user).await?;
                info!(user_id = %user.id, "Created user");
            }
        }

        Ok(user)
    }

    /// Inserts a new user; an existing id is a `Conflict` and the stored
    /// record is left untouched
    pub async fn create_user(&self, mut user: User, password: Option<&str>) -> IdentityResult<User> {
        validate_id("User", &user.id)?;

        if let Some(password) = password {
            user.password_hash = Some(hash_password(password)?);
        }

        self.users.insert(&user).await.map_err(|err| match err {
            PersistenceError::Conflict(_) => IdentityError::Conflict(format!(
                "A user with id '{}' already exists.",
                user.id
            )),
            other => other.into(),
        })?;

        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> IdentityResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Applies a partial update; fails with `NotFound` for unknown ids
    pub async fn update_user(&self, id: &str, mut changes: UpdateUser) -> IdentityResult<User> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| IdentityError::NotFound(format!("Could not find a user with id '{}'.", id)))?;

        let password = changes.password.take();
        user.apply(changes);
        if let Some(password) = password {
            user.password_hash = Some(hash_password(&password)?);
        }

        self.users.update(&user).await?;
        debug!(user_id = %id, "Updated user");
        Ok(user)
    }

    pub async fn delete_user(&self, id: &str) -> IdentityResult<bool> {
        let deleted = self.users.delete(id).await?;
        if deleted {
            info!(user_id = %id, "Deleted user");
        }
        Ok(deleted)
    }

    /// False for unknown users and users without a password
    pub async fn check_password(&self, id: &str, password: &str) -> IdentityResult<bool> {
        match self.users.find_by_id(id).await? {
            Some(User {
                password_hash: Some(hash),
                ..
            }) => Ok(verify_password(password, &hash)?),
            _ => Ok(false),
        }
    }

    pub fn new_group(&self, id: &str) -> IdentityResult<Group> {
        validate_id("Group", id)?;
        Ok(Group::new(id))
    }

    /// Inserts the group, or updates it when the id already exists
    pub async fn save_group(&self, group: Group) -> IdentityResult<Group> {
        validate_id("Group", &group.id)?;

        if self.groups.find_by_id(&group.id).await?.is_some() {
            self.groups.update(&group).await?;
        } else {
            self.groups.insert(&group).await?;
            info!(group_id = %group.id, "Created group");
        }
        Ok(group)
    }

    pub async fn delete_group(&self, id: &str) -> IdentityResult<bool> {
        Ok(self.groups.delete(id).await?)
    }

    pub async fn create_membership(&self, user_id: &str, group_id: &str) -> IdentityResult<()> {
        self.groups.create_membership(user_id, group_id).await?;
        debug!(user_id, group_id, "Created membership");
        Ok(())
    }

    pub async fn delete_membership(&self, user_id: &str, group_id: &str) -> IdentityResult<bool> {
        Ok(self.groups.delete_membership(user_id, group_id).await?)
    }

    pub async fn groups_for_user(&self, user_id: &str) -> IdentityResult<Vec<Group>> {
        Ok(self.groups.find_groups_for_user(user_id).await?)
    }
}
