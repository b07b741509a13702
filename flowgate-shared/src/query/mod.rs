/// Query criteria
///
/// Queries are plain criteria objects built fluently and handed to a data
/// manager (directly or through an entity manager). They carry no connection
/// and never execute themselves.
///
/// ```
/// use flowgate_shared::query::{SortOrder, UserQuery, UserQueryProperty};
///
/// let query = UserQuery::new()
///     .user_email_like("%@muppets.com")
///     .member_of_group("management")
///     .order_by(UserQueryProperty::LastName, SortOrder::Desc);
///
/// assert_eq!(query.member_of_group.as_deref(), Some("management"));
/// ```
///
/// # Modules
///
/// - `user`: [`UserQuery`] over identity users
/// - `form_instance`: [`FormInstanceQuery`] over submitted form instances

pub mod form_instance;
pub mod user;

pub use form_instance::{FormInstanceQuery, FormInstanceQueryProperty};
pub use user::{UserQuery, UserQueryProperty};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// SQL keyword for ORDER BY clauses
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("'{}' is not a valid sort order", other)),
        }
    }
}

/// Paging window: skip `first_result` rows, return at most `max_results`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub first_result: i64,
    pub max_results: i64,
}

impl Page {
    pub fn new(first_result: i64, max_results: i64) -> Self {
        Self {
            first_result: first_result.max(0),
            max_results: max_results.max(0),
        }
    }
}

/// Matches `value` against a SQL `LIKE` pattern
///
/// `%` matches any run of characters (including none) and `_` matches exactly
/// one. There is no escape character, so `\` is an ordinary character; the
/// Postgres store issues `LIKE ... ESCAPE ''` to agree. Comparison is
/// case-sensitive.
pub fn like_matches(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let value: Vec<char> = value.chars().collect();

    let (mut p, mut v) = (0, 0);
    // Position of the last `%` seen and the value index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, v));
                p += 1;
            }
            Some('_') => {
                p += 1;
                v += 1;
            }
            Some(c) if *c == value[v] => {
                p += 1;
                v += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    v = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_exact_and_wildcards() {
        assert!(like_matches("kermit", "kermit"));
        assert!(!like_matches("kermit", "Kermit"));
        assert!(like_matches("%mit", "kermit"));
        assert!(like_matches("ker%", "kermit"));
        assert!(like_matches("%rm%", "kermit"));
        assert!(like_matches("k_rmit", "kermit"));
        assert!(!like_matches("k_mit", "kermit"));
        assert!(like_matches("%", ""));
        assert!(!like_matches("_", ""));
    }

    #[test]
    fn test_like_backslash_is_literal() {
        assert!(like_matches("100\\%", "100\\ off"));
        assert!(!like_matches("100\\%", "100%"));
        assert!(like_matches("a\\_c", "a\\bc"));
        assert!(!like_matches("a\\_c", "a_c"));
    }

    #[test]
    fn test_like_backtracking() {
        assert!(like_matches("%@muppets.com", "kermit@muppets.com"));
        assert!(like_matches("a%b%c", "aXbYbZc"));
        assert!(!like_matches("a%b%c", "aXbYbZ"));
        assert!(like_matches("%a%a", "banana"));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("DESC".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn test_page_clamps_negative_values() {
        let page = Page::new(-5, -1);
        assert_eq!(page, Page { first_result: 0, max_results: 0 });
    }
}
