/// Entity managers
///
/// Each entity manager owns a shared handle to its data manager and forwards
/// to it unchanged. The data manager can be swapped at runtime with
/// `set_data_manager`, which is how tests and the server pick a backend.
use super::{
    FormInstanceDataManager, GroupDataManager, PersistenceResult, UserDataManager,
};
use crate::models::{FormInstance, Group, User};
use crate::query::{FormInstanceQuery, Page, UserQuery};
use std::sync::Arc;

/// Façade over a [`FormInstanceDataManager`]
#[derive(Clone)]
pub struct FormInstanceEntityManager {
    data_manager: Arc<dyn FormInstanceDataManager>,
}

impl FormInstanceEntityManager {
    pub fn new(data_manager: Arc<dyn FormInstanceDataManager>) -> Self {
        Self { data_manager }
    }

    pub async fn find_form_instance_count_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
    ) -> PersistenceResult<i64> {
        self.data_manager
            .find_form_instance_count_by_query_criteria(query)
            .await
    }

    pub async fn find_form_instances_by_query_criteria(
        &self,
        query: &FormInstanceQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<FormInstance>> {
        self.data_manager
            .find_form_instances_by_query_criteria(query, page)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<FormInstance>> {
        self.data_manager.find_by_id(id).await
    }

    pub async fn insert(&self, instance: &FormInstance) -> PersistenceResult<()> {
        self.data_manager.insert(instance).await
    }

    pub async fn update(&self, instance: &FormInstance) -> PersistenceResult<()> {
        self.data_manager.update(instance).await
    }

    pub async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        self.data_manager.delete(id).await
    }

    pub fn data_manager(&self) -> &Arc<dyn FormInstanceDataManager> {
        &self.data_manager
    }

    pub fn set_data_manager(&mut self, data_manager: Arc<dyn FormInstanceDataManager>) {
        self.data_manager = data_manager;
    }
}

/// Façade over a [`UserDataManager`]
#[derive(Clone)]
pub struct UserEntityManager {
    data_manager: Arc<dyn UserDataManager>,
}

impl UserEntityManager {
    pub fn new(data_manager: Arc<dyn UserDataManager>) -> Self {
        Self { data_manager }
    }

    pub async fn find_user_count_by_query_criteria(&self, query: &UserQuery) -> PersistenceResult<i64> {
        self.data_manager.find_user_count_by_query_criteria(query).await
    }

    pub async fn find_users_by_query_criteria(
        &self,
        query: &UserQuery,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<User>> {
        self.data_manager
            .find_users_by_query_criteria(query, page)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<User>> {
        self.data_manager.find_by_id(id).await
    }

    pub async fn insert(&self, user: &User) -> PersistenceResult<()> {
        self.data_manager.insert(user).await
    }

    pub async fn update(&self, user: &User) -> PersistenceResult<()> {
        self.data_manager.update(user).await
    }

    pub async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        self.data_manager.delete(id).await
    }

    pub fn data_manager(&self) -> &Arc<dyn UserDataManager> {
        &self.data_manager
    }

    pub fn set_data_manager(&mut self, data_manager: Arc<dyn UserDataManager>) {
        self.data_manager = data_manager;
    }
}

/// Façade over a [`GroupDataManager`]
#[derive(Clone)]
pub struct GroupEntityManager {
    data_manager: Arc<dyn GroupDataManager>,
}

impl GroupEntityManager {
    pub fn new(data_manager: Arc<dyn GroupDataManager>) -> Self {
        Self { data_manager }
    }

    pub async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<Group>> {
        self.data_manager.find_by_id(id).await
    }

    pub async fn insert(&self, group: &Group) -> PersistenceResult<()> {
        self.data_manager.insert(group).await
    }

    pub async fn update(&self, group: &Group) -> PersistenceResult<()> {
        self.data_manager.update(group).await
    }

    pub async fn delete(&self, id: &str) -> PersistenceResult<bool> {
        self.data_manager.delete(id).await
    }

    pub async fn create_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<()> {
        self.data_manager.create_membership(user_id, group_id).await
    }

    pub async fn delete_membership(&self, user_id: &str, group_id: &str) -> PersistenceResult<bool> {
        self.data_manager.delete_membership(user_id, group_id).await
    }

    pub async fn find_groups_for_user(&self, user_id: &str) -> PersistenceResult<Vec<Group>> {
        self.data_manager.find_groups_for_user(user_id).await
    }

    pub fn data_manager(&self) -> &Arc<dyn GroupDataManager> {
        &self.data_manager
    }

    pub fn set_data_manager(&mut self, data_manager: Arc<dyn GroupDataManager>) {
        self.data_manager = data_manager;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DataManager, MemoryStore};
    use crate::query::{FormInstanceQueryProperty, SortOrder};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns canned rows and records the arguments it was called with
    #[derive(Default)]
    struct RecordingDataManager {
        rows: Vec<FormInstance>,
        calls: Mutex<Vec<(FormInstanceQuery, Option<Page>)>>,
    }

    #[async_trait]
    impl DataManager<FormInstance> for RecordingDataManager {
        async fn find_by_id(&self, id: &str) -> PersistenceResult<Option<FormInstance>> {
            Ok(self.rows.iter().find(|r| r.id == id).cloned())
        }

        async fn insert(&self, _: &FormInstance) -> PersistenceResult<()> {
            Ok(())
        }

        async fn update(&self, _: &FormInstance) -> PersistenceResult<()> {
            Ok(())
        }

        async fn delete(&self, _: &str) -> PersistenceResult<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl FormInstanceDataManager for RecordingDataManager {
        async fn find_form_instance_count_by_query_criteria(
            &self,
            query: &FormInstanceQuery,
        ) -> PersistenceResult<i64> {
            self.calls.lock().unwrap().push((query.clone(), None));
            Ok(42)
        }

        async fn find_form_instances_by_query_criteria(
            &self,
            query: &FormInstanceQuery,
            page: Option<Page>,
        ) -> PersistenceResult<Vec<FormInstance>> {
            self.calls.lock().unwrap().push((query.clone(), page));
            Ok(self.rows.clone())
        }
    }

    #[tokio::test]
    async fn test_forwards_criteria_and_page_unchanged() {
        let recording = Arc::new(RecordingDataManager {
            rows: vec![FormInstance::new("a"), FormInstance::new("b")],
            ..Default::default()
        });
        let manager = FormInstanceEntityManager::new(recording.clone());

        let query = FormInstanceQuery::new()
            .task_id("task-7")
            .order_by(FormInstanceQueryProperty::TenantId, SortOrder::Desc);
        let page = Page::new(5, 15);

        assert_eq!(
            manager
                .find_form_instance_count_by_query_criteria(&query)
                .await
                .unwrap(),
            42
        );
        let rows = manager
            .find_form_instances_by_query_criteria(&query, Some(page))
            .await
            .unwrap();
        assert_eq!(rows, recording.rows);

        let calls = recording.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(query.clone(), None), (query, Some(page))]
        );
    }

    #[tokio::test]
    async fn test_results_match_direct_data_manager_calls() {
        let store = Arc::new(MemoryStore::new());
        for (i, definition) in ["leave:1", "leave:2", "expense:1", "leave:1"].iter().enumerate() {
            let mut instance = FormInstance::new(*definition);
            instance.submitted_by = Some(format!("user-{}", i % 2));
            DataManager::<FormInstance>::insert(store.as_ref(), &instance)
                .await
                .unwrap();
        }
        let manager = FormInstanceEntityManager::new(store.clone());

        let queries = [
            FormInstanceQuery::new(),
            FormInstanceQuery::new().form_definition_id("leave:1"),
            FormInstanceQuery::new().submitted_by_like("user-%"),
            FormInstanceQuery::new().form_definition_id("missing"),
        ];
        let pages = [None, Some(Page::new(0, 2)), Some(Page::new(1, 1)), Some(Page::new(10, 5))];

        for query in &queries {
            assert_eq!(
                manager
                    .find_form_instance_count_by_query_criteria(query)
                    .await
                    .unwrap(),
                store
                    .find_form_instance_count_by_query_criteria(query)
                    .await
                    .unwrap()
            );
            for page in pages {
                assert_eq!(
                    manager
                        .find_form_instances_by_query_criteria(query, page)
                        .await
                        .unwrap(),
                    store
                        .find_form_instances_by_query_criteria(query, page)
                        .await
                        .unwrap()
                );
            }
        }
    }

    #[tokio::test]
    async fn test_set_data_manager_swaps_backend() {
        let first = Arc::new(MemoryStore::new());
        let second = Arc::new(MemoryStore::new());
        let instance = FormInstance::new("leave:1");
        DataManager::<FormInstance>::insert(first.as_ref(), &instance)
            .await
            .unwrap();

        let mut manager = FormInstanceEntityManager::new(first);
        assert!(manager.find_by_id(&instance.id).await.unwrap().is_some());

        manager.set_data_manager(second.clone());
        assert!(manager.find_by_id(&instance.id).await.unwrap().is_none());

        let query = FormInstanceQuery::new();
        assert_eq!(
            manager
                .data_manager()
                .find_form_instance_count_by_query_criteria(&query)
                .await
                .unwrap(),
            0
        );
    }
}
