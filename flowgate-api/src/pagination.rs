/// List pagination
///
/// Collection endpoints share four query parameters:
///
/// - `start`: index of the first row (default 0)
/// - `size`: maximum number of rows (default 10)
/// - `sort`: property name from the endpoint's sort table (default per endpoint)
/// - `order`: `asc` or `desc` (default `asc`)
///
/// and answer with a [`DataResponse`] envelope:
///
/// ```json
/// { "data": [...], "total": 27, "start": 10, "sort": "id", "order": "asc", "size": 10 }
/// ```
///
/// # Example
///
/// ```
/// use flowgate_api::pagination::Paging;
/// use flowgate_shared::query::{SortOrder, UserQueryProperty};
/// use std::collections::HashMap;
///
/// let params = HashMap::from([("sort".to_string(), "email".to_string())]);
/// let paging = Paging::from_params(
///     &params,
///     "id",
///     &[("id", UserQueryProperty::UserId), ("email", UserQueryProperty::Email)],
/// )
/// .unwrap();
///
/// assert_eq!(paging.sort_property, UserQueryProperty::Email);
/// assert_eq!(paging.order, SortOrder::Asc);
/// assert_eq!(paging.page.max_results, 10);
/// ```

use crate::error::{ApiError, ApiResult};
use flowgate_shared::query::{Page, SortOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

pub const DEFAULT_START: i64 = 0;
pub const DEFAULT_SIZE: i64 = 10;

/// Paginated listing envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,

    /// Rows matching the filters, ignoring paging
    pub total: i64,

    pub start: i64,

    pub sort: String,

    pub order: SortOrder,

    /// Rows in `data`
    pub size: usize,
}

/// Parsed paging parameters for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Paging<P> {
    pub page: Page,

    /// Sort parameter as the client named it
    pub sort: String,

    pub sort_property: P,

    pub order: SortOrder,
}

fn parse_non_negative(params: &HashMap<String, String>, name: &str, default: i64) -> ApiResult<i64> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value >= 0 => Ok(value),
            _ => Err(ApiError::BadRequest(format!(
                "Value for param '{}' is not valid, '{}' is not a non-negative integer",
                name, raw
            ))),
        },
    }
}

impl<P: Copy> Paging<P> {
    /// Parses `start`, `size`, `sort` and `order` from the raw query map
    ///
    /// `properties` maps allowed `sort` values to query properties and must
    /// contain `default_sort`.
    ///
    /// # Errors
    ///
    /// `BadRequest` for negative or non-numeric `start`/`size`, a `sort` not in
    /// `properties`, or an `order` other than `asc`/`desc`.
    pub fn from_params(
        params: &HashMap<String, String>,
        default_sort: &str,
        properties: &[(&str, P)],
    ) -> ApiResult<Self> {
        let start = parse_non_negative(params, "start", DEFAULT_START)?;
        let size = parse_non_negative(params, "size", DEFAULT_SIZE)?;

        let sort = params
            .get("sort")
            .map(String::as_str)
            .unwrap_or(default_sort);
        let sort_property = properties
            .iter()
            .find(|(name, _)| *name == sort)
            .map(|(_, property)| *property)
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Value for param 'sort' is not valid, '{}' is not a valid property",
                    sort
                ))
            })?;

        let order = match params.get("order") {
            None => SortOrder::Asc,
            Some(raw) => raw.parse::<SortOrder>().map_err(|_| {
                ApiError::BadRequest(format!(
                    "Value for param 'order' is not valid : '{}', must be 'asc' or 'desc'",
                    raw
                ))
            })?,
        };

        Ok(Self {
            page: Page::new(start, size),
            sort: sort.to_string(),
            sort_property,
            order,
        })
    }

    /// Wraps one page of rows in the response envelope
    pub fn response<T>(&self, data: Vec<T>, total: i64) -> DataResponse<T> {
        DataResponse {
            size: data.len(),
            data,
            total,
            start: self.page.first_result,
            sort: self.sort.clone(),
            order: self.order,
        }
    }
}

/// Runs a paginated listing: parses the paging parameters, then calls
/// `count` and `fetch` with the chosen sort property, order and page
///
/// # Errors
///
/// Paging errors from [`Paging::from_params`] (before either callback runs)
/// and whatever `count` or `fetch` return.
pub async fn paginate_list<P, T, C, CFut, F, FFut>(
    params: &HashMap<String, String>,
    default_sort: &str,
    properties: &[(&str, P)],
    count: C,
    fetch: F,
) -> ApiResult<DataResponse<T>>
where
    P: Copy,
    C: FnOnce() -> CFut,
    CFut: Future<Output = ApiResult<i64>>,
    F: FnOnce(P, SortOrder, Page) -> FFut,
    FFut: Future<Output = ApiResult<Vec<T>>>,
{
    let paging = Paging::from_params(params, default_sort, properties)?;

    let total = count().await?;
    let data = fetch(paging.sort_property, paging.order, paging.page).await?;

    Ok(paging.response(data, total))
}
