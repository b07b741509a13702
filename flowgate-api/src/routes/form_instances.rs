/// Form instance endpoints
///
/// # Endpoints
///
/// - `GET /form/form-instances` - List submitted form instances
/// - `GET /form/form-instances/:id` - Get a form instance

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    pagination::{paginate_list, DataResponse},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use flowgate_shared::{
    models::FormInstance,
    query::{FormInstanceQuery, FormInstanceQueryProperty},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const FORM_INSTANCE_SORT_PROPERTIES: &[(&str, FormInstanceQueryProperty)] = &[
    ("submittedDate", FormInstanceQueryProperty::SubmittedDate),
    ("tenantId", FormInstanceQueryProperty::TenantId),
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInstanceResponse {
    pub id: String,

    pub form_definition_id: String,

    pub task_id: Option<String>,

    pub process_instance_id: Option<String>,

    pub process_definition_id: Option<String>,

    pub submitted_date: DateTime<Utc>,

    pub submitted_by: Option<String>,

    pub form_values_id: Option<String>,

    /// `null` when the instance belongs to no tenant
    pub tenant_id: Option<String>,

    pub url: String,
}

impl From<FormInstance> for FormInstanceResponse {
    fn from(instance: FormInstance) -> Self {
        let tenant_id = instance.has_tenant().then(|| instance.tenant_id.clone());
        Self {
            url: format!("/form/form-instances/{}", instance.id),
            id: instance.id,
            form_definition_id: instance.form_definition_id,
            task_id: instance.task_id,
            process_instance_id: instance.process_instance_id,
            process_definition_id: instance.process_definition_id,
            submitted_date: instance.submitted_date,
            submitted_by: instance.submitted_by,
            form_values_id: instance.form_values_id,
            tenant_id,
        }
    }
}

/// Translates the recognized query parameters into form instance criteria
///
/// # Errors
///
/// `BadRequest` when `withoutTenantId` is neither `true` nor `false`.
pub fn form_instance_query_from_params(
    params: &HashMap<String, String>,
) -> ApiResult<FormInstanceQuery> {
    let mut query = FormInstanceQuery::new();

    if let Some(id) = params.get("id") {
        query = query.id(id);
    }
    if let Some(value) = params.get("formDefinitionId") {
        query = query.form_definition_id(value);
    }
    if let Some(pattern) = params.get("formDefinitionIdLike") {
        query = query.form_definition_id_like(pattern);
    }
    if let Some(value) = params.get("taskId") {
        query = query.task_id(value);
    }
    if let Some(pattern) = params.get("taskIdLike") {
        query = query.task_id_like(pattern);
    }
    if let Some(value) = params.get("processInstanceId") {
        query = query.process_instance_id(value);
    }
    if let Some(pattern) = params.get("processInstanceIdLike") {
        query = query.process_instance_id_like(pattern);
    }
    if let Some(value) = params.get("processDefinitionId") {
        query = query.process_definition_id(value);
    }
    if let Some(pattern) = params.get("processDefinitionIdLike") {
        query = query.process_definition_id_like(pattern);
    }
    if let Some(value) = params.get("submittedBy") {
        query = query.submitted_by(value);
    }
    if let Some(pattern) = params.get("submittedByLike") {
        query = query.submitted_by_like(pattern);
    }
    if let Some(value) = params.get("tenantId") {
        query = query.tenant_id(value);
    }
    if let Some(pattern) = params.get("tenantIdLike") {
        query = query.tenant_id_like(pattern);
    }
    if let Some(raw) = params.get("withoutTenantId") {
        match raw.as_str() {
            "true" => query = query.without_tenant_id(),
            "false" => {}
            _ => {
                return Err(ApiError::BadRequest(format!(
                    "Value for param 'withoutTenantId' is not valid, '{}' is not a boolean",
                    raw
                )))
            }
        }
    }

    Ok(query)
}

/// List form instances
///
/// # Endpoint
///
/// ```text
/// GET /form/form-instances?processInstanceId=42&sort=submittedDate&order=desc
/// ```
///
/// Filters: `id`, `formDefinitionId`, `taskId`, `processInstanceId`,
/// `processDefinitionId`, `submittedBy`, `tenantId` (each with a `...Like`
/// variant) and `withoutTenantId`.
/// Sort: `submittedDate` (default), `tenantId`.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid paging parameter or `withoutTenantId`
pub async fn list_form_instances(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<DataResponse<FormInstanceResponse>>> {
    let query = &form_instance_query_from_params(&params)?;
    let manager = &state.form_instances;

    let response = paginate_list(
        &params,
        "submittedDate",
        FORM_INSTANCE_SORT_PROPERTIES,
        move || async move {
            manager
                .find_form_instance_count_by_query_criteria(query)
                .await
                .map_err(ApiError::from)
        },
        move |property, order, page| async move {
            let sorted = query.clone().order_by(property, order);
            let instances = manager
                .find_form_instances_by_query_criteria(&sorted, Some(page))
                .await?;
            Ok::<_, ApiError>(
                instances
                    .into_iter()
                    .map(FormInstanceResponse::from)
                    .collect::<Vec<_>>(),
            )
        },
    )
    .await?;

    Ok(Json(response))
}

/// Get a form instance
///
/// # Errors
///
/// - `404 Not Found`: No form instance with that id
pub async fn get_form_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FormInstanceResponse>> {
    let instance = state.form_instances.find_by_id(&id).await?.ok_or_else(|| {
        ApiError::NotFound(format!("Could not find a form instance with id '{}'.", id))
    })?;

    Ok(Json(FormInstanceResponse::from(instance)))
}
