use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::model::User;

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,                           // gen_random_uuid()
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>, // set on soft delete
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            phone: r.phone,
            avatar: r.avatar,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, phone, avatar, created_at, updated_at, deleted_at";
