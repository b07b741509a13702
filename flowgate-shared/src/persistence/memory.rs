/// In-process data managers
///
/// `MemoryStore` implements every data manager over `BTreeMap`s guarded by a
/// tokio `RwLock`. It follows the Postgres store's semantics: `LIKE` matching
/// via [`like_matches`] with no escape character, byte-order string sorting
/// (the `"C"` collation), NULLs sorting after values, ties broken by id, and
/// memberships cascading when a user or group is deleted.
use super::{
    DataManager, FormInstanceDataManager, GroupDataManager, PersistenceError, PersistenceResult,
    UserDataManager,
};
use crate::models::{FormInstance, Group, Membership, User};
use crate::query::{
    like_matches, FormInstanceQuery, FormInstanceQueryProperty, Page, SortOrder, UserQuery,
    UserQueryProperty,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<String, User>,
    groups: BTreeMap<String, Group>,
    memberships: BTreeSet<Membership>,
    form_instances: BTreeMap<String, FormInstance>,
}

/// Data managers backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Exact match when `expected` is set
fn eq_filter(expected: &Option<String>, actual: Option<&str>) -> bool {
    match expected {
        Some(expected) => actual == Some(expected.as_str()),
        None => true,
    }
}

/// `LIKE` match when `pattern` is set; NULL never matches
fn like_filter(pattern: &Option<String>, actual: Option<&str>) -> bool {
    match pattern {
        Some(pattern) => actual.is_some_and(|value| like_matches(pattern, value)),
        None => true,
    }
}

/// Postgres ordering: NULL compares greater than any value
fn cmp_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn apply_page<T>(rows: Vec<T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(page) => rows
            .into_iter()
            .skip(page.first_result as usize)
            .take(page.max_results as usize)
            .collect(),
        None => rows,
    }
}

fn user_matches(query: &UserQuery, user: &User, memberships: &BTreeSet<Membership>) -> bool {
    eq_filter(&query.id, Some(user.id.as_str()))
        && eq_filter(&query.first_name, user.first_name.as_deref())
        && eq_filter(&query.last_name, user.last_name.as_deref())
        && eq_filter(&query.email, user.email.as_deref())
        && like_filter(&query.first_name_like, user.first_name.as_deref())
        && like_filter(&query.last_name_like, user.last_name.as_deref())
        && like_filter(&query.email_like, user.email.as_deref())
        && query
            .member_of_group
            .as_ref()
            .map_or(true, |group| memberships.contains(&Membership::new(&user.id, group)))
}

fn user_sort_value(user: &User, property: UserQueryProperty) -> Option<&str> {
    match property {
        UserQueryProperty::UserId => Some(user.id.as_str()),
        UserQueryProperty::FirstName => user.first_name.as_deref(),
        UserQueryProperty::LastName => user.last_name.as_deref(),
        UserQueryProperty::Email => user.email.as_deref(),
    }
}

fn form_instance_matches(query: &FormInstanceQuery, instance: &FormInstance) -> bool {
    eq_filter(&query.id, Some(instance.id.as_str()))
        && query.ids.as_ref().map_or(true, |ids| ids.contains(&instance.id))
        && eq_filter(&query.form_definition_id, Some(instance.form_definition_id.as_str()))
        && like_filter(&query.form_definition_id_like, Some(instance.form_definition_id.as_str()))
        && eq_filter(&query.task_id, instance.task_id.as_deref())
        && like_filter(&query.task_id_like, instance.task_id.as_deref())
        && eq_filter(&query.process_instance_id, instance.process_instance_id.as_deref())
        && like_filter(&query.process_instance_id_like, instance.process_instance_id.as_deref())
        && eq_filter(&query.process_definition_id, instance.process_definition_id.as_deref())
        && like_filter(&query.process_definition_id_like, instance.process_definition_id.as_deref())
        && eq_filter(&query.submitted_by, instance.submitted_by.as_deref())
        && like_filter(&query.submitted_by_like, instance.submitted_by.as_deref())
        && eq_filter(&query.tenant_id, Some(instance.tenant_id.as_str()))
        && like_filter(&query.tenant_id_like, Some(instance.tenant_id.as_str()))
        && (!query.without_tenant_id || !instance.has_tenant())
}

fn cmp_form_instances(
    order_by: &[(FormInstanceQueryProperty, SortOrder)],
    a: &FormInstance,
    b: &FormInstance,
) -> Ordering {
    order_by
        .iter()
        .map(|(property, order)| {
            let ordering = match property {
                FormInstanceQueryProperty::SubmittedDate => a.submitted_date.cmp(&b.submitted_date),
                FormInstanceQueryProperty::TenantId => a.tenant_id.cmp(&b.tenant_id),
            };
            directed(ordering, *order)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.id.cmp(&b.id))
}

#[async_trait]
impl DataManager<User> for MemoryStore {
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn insert(&self, user: &User) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(PersistenceError::Conflict(format!(
                "user '{}' already exists",
                user.id
            )));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound(format!("user '{}'", user.id))),
        }
    }

    async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(id).is_some();
        tables.memberships.retain(|m| m.user_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl UserDataManager for MemoryStore {
    async fn find_user_count_by_query_criteria(&self, query: &UserQuery) -> PersistenceResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .users
            .values()
            .filter(|user| user_matches(query, user, &tables.memberships))
            .count();
        Ok(count as i64)
    }

    async fn find_users_by_query_criteria(
        &self,
        query: &UserQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| user_matches(query, user, &tables.memberships))
            .cloned()
            .collect();

        users.sort_by(|a, b| {
            query
                .order_by
                .iter()
                .map(|(property, order)| {
                    directed(
                        cmp_nulls_last(user_sort_value(a, *property), user_sort_value(b, *property)),
                        *order,
                    )
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.id.cmp(&b.id))
        });

        Ok(apply_page(users, page))
    }
}

#[async_trait]
impl DataManager<Group> for MemoryStore {
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(id).cloned())
    }

    async fn insert(&self, group: &Group) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        if tables.groups.contains_key(&group.id) {
            return Err(PersistenceError::Conflict(format!(
                "group '{}' already exists",
                group.id
            )));
        }
        tables.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn update(&self, group: &Group) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&group.id) {
            Some(existing) => {
                *existing = group.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound(format!("group '{}'", group.id))),
        }
    }

    async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.groups.remove(id).is_some();
        tables.memberships.retain(|m| m.group_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl GroupDataManager for MemoryStore {
    async fn create_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(user_id) {
            return Err(PersistenceError::NotFound(format!("user '{}'", user_id)));
        }
        if !tables.groups.contains_key(group_id) {
            return Err(PersistenceError::NotFound(format!("group '{}'", group_id)));
        }
        if !tables.memberships.insert(Membership::new(user_id, group_id)) {
            return Err(PersistenceError::Conflict(format!(
                "user '{}' is already a member of group '{}'",
                user_id, group_id
            )));
        }
        Ok(())
    }

    async fn delete_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.memberships.remove(&Membership::new(user_id, group_id)))
    }

    async fn find_groups_for_user(&self, user_id: &str) -> PersistenceResult<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.groups.get(&m.group_id).cloned())
            .collect())
    }
}

#[async_trait]
impl DataManager<FormInstance> for MemoryStore {
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<FormInstance>> {
        Ok(self.tables.read().await.form_instances.get(id).cloned())
    }

    async fn insert(&self, instance: &FormInstance) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        if tables.form_instances.contains_key(&instance.id) {
            return Err(PersistenceError::Conflict(format!(
                "form instance '{}' already exists",
                instance.id
            )));
        }
        tables
            .form_instances
            .insert(instance.id.clone(), instance.clone());
        Ok(())
    }

    async fn update(&self, instance: &FormInstance) -> PersistenceResult<()> {
        let mut tables = self.tables.write().await;
        match tables.form_instances.get_mut(&instance.id) {
            Some(existing) => {
                *existing = instance.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound(format!(
                "form instance '{}'",
                instance.id
            ))),
        }
    }

    async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        Ok(self.tables.write().await.form_instances.remove(id).is_some())
    }
}

#[async_trait]
impl FormInstanceDataManager for MemoryStore {
    async fn find_form_instance_count_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
    ) -> PersistenceResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .form_instances
            .values()
            .filter(|instance| form_instance_matches(query, instance))
            .count();
        Ok(count as i64)
    }

    async fn find_form_instances_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<FormInstance>> {
        let tables = self.tables.read().await;
        let mut instances: Vec<FormInstance> = tables
            .form_instances
            .values()
            .filter(|instance| form_instance_matches(query, instance))
            .cloned()
            .collect();

        instances.sort_by(|a, b| cmp_form_instances(&query.order_by, a, b));

        Ok(apply_page(instances, page))
    }
}
