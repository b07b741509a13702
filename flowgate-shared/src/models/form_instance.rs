/// Submitted form instance
///
/// A form instance records one submission of a form definition, optionally
/// tied to the task and process instance it was submitted for. The submitted
/// values themselves are stored elsewhere and referenced by `form_values_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE form_instances (
///     id VARCHAR(64) PRIMARY KEY,
///     form_definition_id VARCHAR(255) NOT NULL,
///     task_id VARCHAR(64),
///     process_instance_id VARCHAR(64),
///     process_definition_id VARCHAR(255),
///     submitted_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     submitted_by VARCHAR(255),
///     form_values_id VARCHAR(64),
///     tenant_id VARCHAR(255) NOT NULL DEFAULT ''
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant id used for rows that belong to no tenant
pub const NO_TENANT_ID: &str = "";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FormInstance {
    pub id: String,

    pub form_definition_id: String,

    pub task_id: Option<String>,

    pub process_instance_id: Option<String>,

    pub process_definition_id: Option<String>,

    pub submitted_date: DateTime<Utc>,

    pub submitted_by: Option<String>,

    pub form_values_id: Option<String>,

    /// Empty when the instance belongs to no tenant
    pub tenant_id: String,
}

impl FormInstance {
    /// Builds an unsaved instance with a generated id, submitted now
    pub fn new(form_definition_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            form_definition_id: form_definition_id.into(),
            task_id: None,
            process_instance_id: None,
            process_definition_id: None,
            submitted_date: Utc::now(),
            submitted_by: None,
            form_values_id: None,
            tenant_id: NO_TENANT_ID.to_string(),
        }
    }

    pub fn has_tenant(&self) -> bool {
        self.tenant_id != NO_TENANT_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_instance() {
        let instance = FormInstance::new("leave-request:1");
        assert_eq!(instance.form_definition_id, "leave-request:1");
        assert!(!instance.id.is_empty());
        assert!(!instance.has_tenant());

        let other = FormInstance::new("leave-request:1");
        assert_ne!(instance.id, other.id);
    }
}
