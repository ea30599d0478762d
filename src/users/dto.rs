use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::{
    model::{NewUser, User},
    querying::{PaginationParams, SortParams},
    services::ListUsersResponse,
};

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            phone: r.phone,
            avatar: r.avatar,
        }
    }
}

/// Request body for a partial update; the id comes from the path.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// Query string of the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
    #[serde(default)]
    pub reverse: bool,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListUsersQuery {
    pub fn into_params(self) -> (PaginationParams, SortParams) {
        (
            PaginationParams::new(self.page, self.page_size, self.reverse),
            SortParams::new(self.sort_by, self.sort_order),
        )
    }
}

/// User as returned to clients.
#[derive(Debug, Serialize)]
pub struct UserReply {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserReply {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            phone: u.phone,
            avatar: u.avatar,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListUsersReply {
    pub users: Vec<UserReply>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,       // users in this page
    pub total_pages: i64, // active users overall
    pub reverse: bool,
}

impl From<ListUsersResponse> for ListUsersReply {
    fn from(r: ListUsersResponse) -> Self {
        Self {
            users: r.users.into_iter().map(UserReply::from).collect(),
            page: r.pagination.page,
            page_size: r.pagination.page_size,
            total: r.total,
            total_pages: r.total_pages,
            reverse: r.pagination.reverse,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteUserReply {
    pub id: String,
}
