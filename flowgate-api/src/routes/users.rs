/// Identity user endpoints
///
/// # Endpoints
///
/// - `GET /identity/users` - List users
/// - `POST /identity/users` - Create a user
/// - `GET /identity/users/:id` - Get a user
/// - `PUT /identity/users/:id` - Update a user
/// - `DELETE /identity/users/:id` - Delete a user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    pagination::{paginate_list, DataResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use flowgate_shared::{
    models::{UpdateUser, User},
    query::{UserQuery, UserQueryProperty},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::info;
use validator::Validate;

/// Maximum length of names and email addresses
const MAX_FIELD_LENGTH: usize = 255;

/// `sort` values accepted by the user listing
pub const USER_SORT_PROPERTIES: &[(&str, UserQueryProperty)] = &[
    ("id", UserQueryProperty::UserId),
    ("firstName", UserQueryProperty::FirstName),
    ("lastName", UserQueryProperty::LastName),
    ("email", UserQueryProperty::Email),
];

/// Create user request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    /// Required; checked before the other validations
    #[validate(length(max = 64, message = "Id must be at most 64 characters"))]
    pub id: Option<String>,

    #[validate(length(max = 255, message = "First name must be at most 255 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 255, message = "Last name must be at most 255 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: Option<String>,

    pub password: Option<String>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Update user request
///
/// Only fields present in the body change; `null` clears a field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,

    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn validate_lengths(&self) -> ApiResult<()> {
        let errors: Vec<ValidationErrorDetail> = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
        ]
        .into_iter()
        .filter_map(|(field, value)| match value {
            Some(Some(value)) if value.chars().count() > MAX_FIELD_LENGTH => {
                Some(ValidationErrorDetail {
                    field: field.to_string(),
                    message: format!("Must be at most {} characters", MAX_FIELD_LENGTH),
                })
            }
            _ => None,
        })
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(errors))
        }
    }
}

/// User representation; the password is never returned
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub email: Option<String>,

    /// Path of the single-user resource
    pub url: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            url: format!("/identity/users/{}", user.id),
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// Translates the recognized query parameters into user criteria
///
/// Keys outside the recognized set (including the paging keys) are ignored.
pub fn user_query_from_params(params: &HashMap<String, String>) -> UserQuery {
    let mut query = UserQuery::new();

    if let Some(id) = params.get("id") {
        query = query.user_id(id);
    }
    if let Some(first_name) = params.get("firstName") {
        query = query.user_first_name(first_name);
    }
    if let Some(last_name) = params.get("lastName") {
        query = query.user_last_name(last_name);
    }
    if let Some(email) = params.get("email") {
        query = query.user_email(email);
    }
    if let Some(pattern) = params.get("firstNameLike") {
        query = query.user_first_name_like(pattern);
    }
    if let Some(pattern) = params.get("lastNameLike") {
        query = query.user_last_name_like(pattern);
    }
    if let Some(pattern) = params.get("emailLike") {
        query = query.user_email_like(pattern);
    }
    if let Some(group_id) = params.get("memberOfGroup") {
        query = query.member_of_group(group_id);
    }

    query
}

/// List users
///
/// # Endpoint
///
/// ```text
/// GET /identity/users?emailLike=%25@muppets.com&sort=lastName&order=desc&start=0&size=10
/// ```
///
/// Filters: `id`, `firstName`, `lastName`, `email`, `firstNameLike`,
/// `lastNameLike`, `emailLike` (`%` wildcard), `memberOfGroup`.
/// Sort: `id` (default), `firstName`, `lastName`, `email`.
///
/// # Response
///
/// ```json
/// {
///   "data": [
///     {
///       "id": "kermit",
///       "firstName": "Kermit",
///       "lastName": "Frog",
///       "email": "kermit@muppets.com",
///       "url": "/identity/users/kermit"
///     }
///   ],
///   "total": 1,
///   "start": 0,
///   "sort": "lastName",
///   "order": "desc",
///   "size": 1
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Invalid `sort`, `order`, `start` or `size`
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<DataResponse<UserResponse>>> {
    let query = &user_query_from_params(&params);
    let identity = &state.identity;

    let response = paginate_list(
        &params,
        "id",
        USER_SORT_PROPERTIES,
        move || async move { identity.count_users(query).await.map_err(ApiError::from) },
        move |property, order, page| async move {
            let sorted = query.clone().order_by(property, order);
            let users = identity.list_users(&sorted, Some(page)).await?;
            Ok::<_, ApiError>(users.into_iter().map(UserResponse::from).collect::<Vec<_>>())
        },
    )
    .await?;

    Ok(Json(response))
}

/// Create a user
///
/// # Endpoint
///
/// ```text
/// POST /identity/users
/// Content-Type: application/json
///
/// {
///   "id": "tijs",
///   "firstName": "Tijs",
///   "lastName": "Barrez",
///   "email": "no-reply@flowgate.org",
///   "password": "pass123"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user representation.
///
/// # Errors
///
/// - `400 Bad Request`: `id` missing or blank
/// - `409 Conflict`: A user with that id already exists
/// - `422 Unprocessable Entity`: A field is too long
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let id = match req.id.as_deref() {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => return Err(ApiError::BadRequest("Id cannot be null.".to_string())),
    };

    req.validate()?;

    let existing = state
        .identity
        .count_users(&state.identity.create_user_query().user_id(&id))
        .await?;
    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "A user with id '{}' already exists.",
            id
        )));
    }

    let mut user = state.identity.new_user(&id)?;
    user.email = req.email;
    user.first_name = req.first_name;
    user.last_name = req.last_name;

    let created = state
        .identity
        .create_user(user, req.password.as_deref())
        .await?;

    info!(user_id = %created.id, "User created via API");
    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Get a user
///
/// # Errors
///
/// - `404 Not Found`: No user with that id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .identity
        .get_user(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Could not find a user with id '{}'.", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user
///
/// # Endpoint
///
/// ```text
/// PUT /identity/users/:id
/// Content-Type: application/json
///
/// { "lastName": "Frog", "email": null }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No user with that id
/// - `422 Unprocessable Entity`: A field is too long
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate_lengths()?;

    let user = state
        .identity
        .update_user(
            &id,
            UpdateUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a user
///
/// # Errors
///
/// - `404 Not Found`: No user with that id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.identity.delete_user(&id).await? {
        return Err(ApiError::NotFound(format!(
            "Could not find a user with id '{}'.",
            id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgate_shared::models::MAX_ID_LENGTH;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_from_recognized_params() {
        let query = user_query_from_params(&params(&[
            ("id", "kermit"),
            ("firstName", "Kermit"),
            ("lastName", "Frog"),
            ("email", "kermit@muppets.com"),
            ("firstNameLike", "K%"),
            ("lastNameLike", "F%"),
            ("emailLike", "%@muppets.com"),
            ("memberOfGroup", "muppets"),
        ]));

        assert_eq!(
            query,
            UserQuery::new()
                .user_id("kermit")
                .user_first_name("Kermit")
                .user_last_name("Frog")
                .user_email("kermit@muppets.com")
                .user_first_name_like("K%")
                .user_last_name_like("F%")
                .user_email_like("%@muppets.com")
                .member_of_group("muppets")
        );
    }

    #[test]
    fn test_unrecognized_params_are_ignored() {
        let query = user_query_from_params(&params(&[
            ("potentialStarter", "process:1"),
            ("favouriteColour", "green"),
            ("start", "5"),
        ]));
        assert_eq!(query, UserQuery::new());
    }

    #[test]
    fn test_update_request_distinguishes_null_and_absent() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"firstName": "Kermit", "email": null}"#).unwrap();
        assert_eq!(req.first_name, Some(Some("Kermit".to_string())));
        assert_eq!(req.email, Some(None));
        assert_eq!(req.last_name, None);
        assert!(req.password.is_none());
    }

    #[test]
    fn test_update_request_length_validation() {
        let req = UpdateUserRequest {
            last_name: Some(Some("x".repeat(MAX_FIELD_LENGTH + 1))),
            ..Default::default()
        };
        match req.validate_lengths() {
            Err(ApiError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "lastName");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_user_response_omits_password() {
        let mut user = User::new("kermit");
        user.password_hash = Some("$argon2id$...".to_string());

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["url"], "/identity/users/kermit");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_max_id_length_matches_validation() {
        let req = UserRequest {
            id: Some("x".repeat(MAX_ID_LENGTH + 1)),
            first_name: None,
            last_name: None,
            email: None,
            password: None,
        };
        assert!(req.validate().is_err());
    }
}
