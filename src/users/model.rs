use time::OffsetDateTime;
use uuid::Uuid;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

/// Fields supplied when creating a user; the store fills in id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// Partial update as received from a caller, id not yet parsed.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// Merged update handed to a repository. `None` leaves the stored value as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Treats an empty string the same as an absent value.
pub(crate) fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
