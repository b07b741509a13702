/// Criteria for listing submitted form instances
use super::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormInstanceQueryProperty {
    SubmittedDate,
    TenantId,
}

impl FormInstanceQueryProperty {
    pub fn column(&self) -> &'static str {
        match self {
            FormInstanceQueryProperty::SubmittedDate => "submitted_date",
            FormInstanceQueryProperty::TenantId => "tenant_id",
        }
    }
}

/// Filter and ordering for form instances; every criterion is ANDed
///
/// `without_tenant_id` restricts to rows whose tenant id is empty and is
/// independent of `tenant_id`/`tenant_id_like`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInstanceQuery {
    pub id: Option<String>,
    pub ids: Option<Vec<String>>,
    pub form_definition_id: Option<String>,
    pub form_definition_id_like: Option<String>,
    pub task_id: Option<String>,
    pub task_id_like: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_instance_id_like: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_id_like: Option<String>,
    pub submitted_by: Option<String>,
    pub submitted_by_like: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_id_like: Option<String>,
    pub without_tenant_id: bool,
    pub order_by: Vec<(FormInstanceQueryProperty, SortOrder)>,
}

impl FormInstanceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn form_definition_id(mut self, value: impl Into<String>) -> Self {
        self.form_definition_id = Some(value.into());
        self
    }

    pub fn form_definition_id_like(mut self, pattern: impl Into<String>) -> Self {
        self.form_definition_id_like = Some(pattern.into());
        self
    }

    pub fn task_id(mut self, value: impl Into<String>) -> Self {
        self.task_id = Some(value.into());
        self
    }

    pub fn task_id_like(mut self, pattern: impl Into<String>) -> Self {
        self.task_id_like = Some(pattern.into());
        self
    }

    pub fn process_instance_id(mut self, value: impl Into<String>) -> Self {
        self.process_instance_id = Some(value.into());
        self
    }

    pub fn process_instance_id_like(mut self, pattern: impl Into<String>) -> Self {
        self.process_instance_id_like = Some(pattern.into());
        self
    }

    pub fn process_definition_id(mut self, value: impl Into<String>) -> Self {
        self.process_definition_id = Some(value.into());
        self
    }

    pub fn process_definition_id_like(mut self, pattern: impl Into<String>) -> Self {
        self.process_definition_id_like = Some(pattern.into());
        self
    }

    pub fn submitted_by(mut self, value: impl Into<String>) -> Self {
        self.submitted_by = Some(value.into());
        self
    }

    pub fn submitted_by_like(mut self, pattern: impl Into<String>) -> Self {
        self.submitted_by_like = Some(pattern.into());
        self
    }

    pub fn tenant_id(mut self, value: impl Into<String>) -> Self {
        self.tenant_id = Some(value.into());
        self
    }

    pub fn tenant_id_like(mut self, pattern: impl Into<String>) -> Self {
        self.tenant_id_like = Some(pattern.into());
        self
    }

    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }

    pub fn order_by(mut self, property: FormInstanceQueryProperty, order: SortOrder) -> Self {
        self.order_by.push((property, order));
        self
    }
}
