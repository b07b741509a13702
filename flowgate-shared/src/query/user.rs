/// Criteria for listing identity users
use super::SortOrder;

/// Properties a user listing can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserQueryProperty {
    UserId,
    FirstName,
    LastName,
    Email,
}

impl UserQueryProperty {
    /// Column backing this property in the `users` table
    pub fn column(&self) -> &'static str {
        match self {
            UserQueryProperty::UserId => "id",
            UserQueryProperty::FirstName => "first_name",
            UserQueryProperty::LastName => "last_name",
            UserQueryProperty::Email => "email",
        }
    }
}

/// Filter and ordering for users; every criterion is ANDed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub first_name_like: Option<String>,
    pub last_name_like: Option<String>,
    pub email_like: Option<String>,
    pub member_of_group: Option<String>,
    pub order_by: Vec<(UserQueryProperty, SortOrder)>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn user_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn user_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn user_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// `%` and `_` act as wildcards
    pub fn user_first_name_like(mut self, pattern: impl Into<String>) -> Self {
        self.first_name_like = Some(pattern.into());
        self
    }

    pub fn user_last_name_like(mut self, pattern: impl Into<String>) -> Self {
        self.last_name_like = Some(pattern.into());
        self
    }

    pub fn user_email_like(mut self, pattern: impl Into<String>) -> Self {
        self.email_like = Some(pattern.into());
        self
    }

    /// Only users with a membership in the given group
    pub fn member_of_group(mut self, group_id: impl Into<String>) -> Self {
        self.member_of_group = Some(group_id.into());
        self
    }

    /// Adds a sort key; earlier keys take precedence
    pub fn order_by(mut self, property: UserQueryProperty, order: SortOrder) -> Self {
        self.order_by.push((property, order));
        self
    }
}
