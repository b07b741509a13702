/// Postgres data managers
///
/// Listing queries are assembled with `sqlx::QueryBuilder` so only the
/// criteria that are set end up in the WHERE clause. Every ORDER BY ends with
/// `id ASC` so paging over equal sort keys stays stable.
///
/// `LIKE` runs with `ESCAPE ''` (no escape character) and text sort keys use
/// the `"C"` collation, so results do not depend on server settings and match
/// [`MemoryStore`](super::MemoryStore).
use super::{
    DataManager, FormInstanceDataManager, GroupDataManager, PersistenceError, PersistenceResult,
    UserDataManager,
};
use crate::models::{FormInstance, Group, User};
use crate::query::{FormInstanceQuery, FormInstanceQueryProperty, Page, SortOrder, UserQuery};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, created_at, updated_at";

const FORM_INSTANCE_COLUMNS: &str = "id, form_definition_id, task_id, process_instance_id, \
     process_definition_id, submitted_date, submitted_by, form_values_id, tenant_id";

/// Data managers backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps constraint violations onto the persistence error variants
fn map_write_error(err: sqlx::Error, what: impl FnOnce() -> String) -> PersistenceError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return PersistenceError::Conflict(format!("{} already exists", what())),
            Some(FOREIGN_KEY_VIOLATION) => return PersistenceError::NotFound(what()),
            _ => {}
        }
    }
    PersistenceError::Database(err)
}

fn push_eq(builder: &mut QueryBuilder<'_, Postgres>, column: &str, value: &Option<String>) {
    if let Some(value) = value {
        builder.push(format!(" AND {} = ", column));
        builder.push_bind(value.clone());
    }
}

fn push_like(builder: &mut QueryBuilder<'_, Postgres>, column: &str, pattern: &Option<String>) {
    if let Some(pattern) = pattern {
        builder.push(format!(" AND {} LIKE ", column));
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE ''");
    }
}

/// Byte-order sort key for a text column
fn collated(column: &str) -> String {
    format!("{} COLLATE \"C\"", column)
}

fn form_instance_sort_key(property: &FormInstanceQueryProperty) -> String {
    match property {
        FormInstanceQueryProperty::SubmittedDate => property.column().to_string(),
        FormInstanceQueryProperty::TenantId => collated(property.column()),
    }
}

fn push_order_by<'a, P, F>(
    builder: &mut QueryBuilder<'_, Postgres>,
    order_by: &'a [(P, SortOrder)],
    sort_key: F,
) where
    F: Fn(&'a P) -> String,
{
    builder.push(" ORDER BY ");
    for (property, order) in order_by {
        builder.push(format!("{} {}, ", sort_key(property), order.as_sql()));
    }
    builder.push(format!("{} ASC", collated("id")));
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: Option<Page>) {
    if let Some(page) = page {
        builder.push(" LIMIT ");
        builder.push_bind(page.max_results);
        builder.push(" OFFSET ");
        builder.push_bind(page.first_result);
    }
}

fn push_user_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    builder.push(" WHERE 1 = 1");
    push_eq(builder, "id", &query.id);
    push_eq(builder, "first_name", &query.first_name);
    push_eq(builder, "last_name", &query.last_name);
    push_eq(builder, "email", &query.email);
    push_like(builder, "first_name", &query.first_name_like);
    push_like(builder, "last_name", &query.last_name_like);
    push_like(builder, "email", &query.email_like);

    if let Some(group_id) = &query.member_of_group {
        builder.push(
            " AND EXISTS (SELECT 1 FROM memberships m WHERE m.user_id = users.id AND m.group_id = ",
        );
        builder.push_bind(group_id.clone());
        builder.push(")");
    }
}

fn push_form_instance_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &FormInstanceQuery) {
    builder.push(" WHERE 1 = 1");
    push_eq(builder, "id", &query.id);

    if let Some(ids) = &query.ids {
        builder.push(" AND id = ANY(");
        builder.push_bind(ids.clone());
        builder.push(")");
    }

    push_eq(builder, "form_definition_id", &query.form_definition_id);
    push_like(builder, "form_definition_id", &query.form_definition_id_like);
    push_eq(builder, "task_id", &query.task_id);
    push_like(builder, "task_id", &query.task_id_like);
    push_eq(builder, "process_instance_id", &query.process_instance_id);
    push_like(builder, "process_instance_id", &query.process_instance_id_like);
    push_eq(builder, "process_definition_id", &query.process_definition_id);
    push_like(builder, "process_definition_id", &query.process_definition_id_like);
    push_eq(builder, "submitted_by", &query.submitted_by);
    push_like(builder, "submitted_by", &query.submitted_by_like);
    push_eq(builder, "tenant_id", &query.tenant_id);
    push_like(builder, "tenant_id", &query.tenant_id_like);

    if query.without_tenant_id {
        builder.push(" AND tenant_id = ''");
    }
}

#[async_trait]
impl DataManager<User> for PgStore {
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: &User) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("user '{}'", user.id)))?;

        debug!(user_id = %user.id, "Inserted user");
        Ok(())
    }

    async fn update(&self, user: &User) -> PersistenceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, password_hash = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!("user '{}'", user.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDataManager for PgStore {
    async fn find_user_count_by_query_criteria(&self, query: &UserQuery) -> PersistenceResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_filters(&mut builder, query);

        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn find_users_by_query_criteria(
        &self,
        query: &UserQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<User>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", USER_COLUMNS));
        push_user_filters(&mut builder, query);
        push_order_by(&mut builder, &query.order_by, |p| collated(p.column()));
        push_page(&mut builder, page);

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}

#[async_trait]
impl DataManager<Group> for PgStore {
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, group_type FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn insert(&self, group: &Group) -> PersistenceResult<()> {
        sqlx::query("INSERT INTO groups (id, name, group_type) VALUES ($1, $2, $3)")
            .bind(&group.id)
            .bind(&group.name)
            .bind(&group.group_type)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || format!("group '{}'", group.id)))?;

        Ok(())
    }

    async fn update(&self, group: &Group) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE groups SET name = $2, group_type = $3 WHERE id = $1")
            .bind(&group.id)
            .bind(&group.name)
            .bind(&group.group_type)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!("group '{}'", group.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GroupDataManager for PgStore {
    async fn create_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<()> {
        sqlx::query("INSERT INTO memberships (user_id, group_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, || {
                    format!("membership of user '{}' in group '{}'", user_id, group_id)
                })
            })?;

        Ok(())
    }

    async fn delete_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<bool> {
        let result = sqlx::query("DELETE FROM memberships WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_groups_for_user(&self, user_id: &str) -> PersistenceResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.name, g.group_type
            FROM groups g
            JOIN memberships m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }
}

#[async_trait]
impl DataManager<FormInstance> for PgStore {
    async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<FormInstance>> {
        let instance = sqlx::query_as::<_, FormInstance>(&format!(
            "SELECT {} FROM form_instances WHERE id = $1",
            FORM_INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(instance)
    }

    async fn insert(&self, instance: &FormInstance) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO form_instances (id, form_definition_id, task_id, process_instance_id,
                                        process_definition_id, submitted_date, submitted_by,
                                        form_values_id, tenant_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&instance.id)
        .bind(&instance.form_definition_id)
        .bind(&instance.task_id)
        .bind(&instance.process_instance_id)
        .bind(&instance.process_definition_id)
        .bind(instance.submitted_date)
        .bind(&instance.submitted_by)
        .bind(&instance.form_values_id)
        .bind(&instance.tenant_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("form instance '{}'", instance.id)))?;

        Ok(())
    }

    async fn update(&self, instance: &FormInstance) -> PersistenceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE form_instances
            SET form_definition_id = $2, task_id = $3, process_instance_id = $4,
                process_definition_id = $5, submitted_date = $6, submitted_by = $7,
                form_values_id = $8, tenant_id = $9
            WHERE id = $1
            "#,
        )
        .bind(&instance.id)
        .bind(&instance.form_definition_id)
        .bind(&instance.task_id)
        .bind(&instance.process_instance_id)
        .bind(&instance.process_definition_id)
        .bind(instance.submitted_date)
        .bind(&instance.submitted_by)
        .bind(&instance.form_values_id)
        .bind(&instance.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!(
                "form instance '{}'",
                instance.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        let result = sqlx::query("DELETE FROM form_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FormInstanceDataManager for PgStore {
    async fn find_form_instance_count_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
    ) -> PersistenceResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM form_instances");
        push_form_instance_filters(&mut builder, query);

        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn find_form_instances_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<FormInstance>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM form_instances",
            FORM_INSTANCE_COLUMNS
        ));
        push_form_instance_filters(&mut builder, query);
        push_order_by(&mut builder, &query.order_by, form_instance_sort_key);
        push_page(&mut builder, page);

        let instances = builder
            .build_query_as::<FormInstance>()
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }
}
