/// Groups and user-group memberships
///
/// # Schema
///
/// ```sql
/// CREATE TABLE groups (
///     id VARCHAR(64) PRIMARY KEY,
///     name VARCHAR(255),
///     group_type VARCHAR(255)
/// );
///
/// CREATE TABLE memberships (
///     user_id VARCHAR(64) NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     group_id VARCHAR(64) NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     PRIMARY KEY (user_id, group_id)
/// );
/// ```

use serde::{Deserialize, Serialize};

/// Named collection of users (e.g. "management", "sales")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: String,

    pub name: Option<String>,

    /// Free-form classifier such as "assignment" or "security-role"
    pub group_type: Option<String>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            group_type: None,
        }
    }
}

/// Link between a user and a group
/// Ordered by user, then group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub user_id: String,

    pub group_id: String,
}

impl Membership {
    pub fn new(user_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            group_id: group_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_memberships_order_by_user_then_group() {
        let set: BTreeSet<Membership> = [
            Membership::new("piggy", "band"),
            Membership::new("kermit", "muppets"),
            Membership::new("kermit", "band"),
        ]
        .into_iter()
        .collect();

        let ordered: Vec<_> = set
            .iter()
            .map(|m| (m.user_id.as_str(), m.group_id.as_str()))
            .collect();
        assert_eq!(
            ordered,
            vec![("kermit", "band"), ("kermit", "muppets"), ("piggy", "band")]
        );
        assert!(set.contains(&Membership::new("kermit", "band")));
    }
}
