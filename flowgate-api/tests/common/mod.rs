/// Common test utilities for integration tests
///
/// Every context runs the full router over a fresh in-memory store, so tests
/// are independent and need no database. Seed data goes straight into the
/// store; assertions can read it back the same way.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use flowgate_api::app::{build_router, AppState};
use flowgate_api::config::Config;
use flowgate_shared::identity::IdentityService;
use flowgate_shared::models::{FormInstance, User};
use flowgate_shared::persistence::{DataManager, MemoryStore};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Test context containing the router and the store behind it
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub identity: IdentityService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_memory_store(store.clone(), Config::in_memory());
        let identity = state.identity.clone();

        TestContext {
            app: build_router(state),
            store,
            identity,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty bodies)
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "Expected JSON body for {} {}, got: {}",
                    method,
                    uri,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }

    /// Inserts a user directly into the store
    pub async fn seed_user(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: Option<&str>,
    ) -> User {
        let mut user = self.identity.new_user(id).unwrap();
        user.first_name = Some(first_name.to_string());
        user.last_name = Some(last_name.to_string());
        user.email = Some(email.to_string());
        self.identity.save_user(user, password).await.unwrap()
    }

    /// Inserts a form instance directly into the store
    pub async fn seed_form_instance(&self, instance: FormInstance) -> FormInstance {
        DataManager::<FormInstance>::insert(self.store.as_ref(), &instance)
            .await
            .unwrap();
        instance
    }

    /// Ids from the `data` array of a listing response, in order
    pub fn ids(body: &Value) -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap_or_else(|| panic!("Expected a data array, got: {}", body))
            .iter()
            .map(|row| row["id"].as_str().unwrap().to_string())
            .collect()
    }
}
