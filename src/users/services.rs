use std::sync::Arc;

use tracing::{instrument, warn, Span};
use uuid::Uuid;

use crate::users::{
    error::UsersError,
    model::{supplied, NewUser, User, UserChanges, UserUpdate},
    querying::{PaginationParams, SortParams},
    repo::UsersRepo,
};

pub type UsersResult<T> = Result<T, UsersError>;

/// One page of users.
///
/// `total` is the size of this page and `total_pages` is the count of every
/// active user. The names are kept as clients already read them this way.
#[derive(Debug, Clone)]
pub struct ListUsersResponse {
    pub pagination: PaginationParams,
    pub total: i64,
    pub total_pages: i64,
    pub users: Vec<User>,
}

/// Business rules around single user operations. Storage is reached only
/// through the injected repository.
#[derive(Clone)]
pub struct UsersUsecase {
    repo: Arc<dyn UsersRepo>,
}

fn parse_id(id: &str) -> UsersResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| {
        warn!(error = %e, id, "malformed user id");
        UsersError::InvalidArgument(format!("invalid user id {id:?}: {e}"))
    })
}

impl UsersUsecase {
    pub fn new(repo: Arc<dyn UsersRepo>) -> Self {
        Self { repo }
    }

    #[instrument(
        name = "users.create",
        skip_all,
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn create_user(&self, user: NewUser) -> UsersResult<User> {
        let created = self.repo.save(user).await?;
        Span::current().record("user_id", tracing::field::display(created.id));
        Ok(created)
    }

    #[instrument(name = "users.get", skip(self), err(level = "warn"))]
    pub async fn get_by_id(&self, id: &str) -> UsersResult<User> {
        let uid = parse_id(id)?;
        Ok(self.repo.find_by_id(uid).await?)
    }

    #[instrument(name = "users.delete", skip(self), err(level = "warn"))]
    pub async fn delete_user(&self, id: &str) -> UsersResult<String> {
        let uid = parse_id(id)?;
        let deleted = self.repo.delete(uid).await?;
        Ok(deleted.to_string())
    }

    #[instrument(name = "users.list", skip(self), err(level = "warn"))]
    pub async fn list_users(
        &self,
        pp: PaginationParams,
        sp: SortParams,
    ) -> UsersResult<ListUsersResponse> {
        if !sp.has_valid_order() {
            return Err(UsersError::BadRequest("invalid sort order".into()));
        }

        let users = self.repo.list_all(pp, sp).await?;
        let count = self.repo.count().await?;

        Ok(ListUsersResponse {
            pagination: pp,
            total: users.len() as i64,
            total_pages: count,
            users,
        })
    }

    /// Partial update. Missing username, email or phone are filled from the
    /// stored record; the record is only read when at least one is missing.
    #[instrument(
        name = "users.update",
        skip_all,
        fields(user_id = %update.id),
        err(level = "warn")
    )]
    pub async fn update_user(&self, update: UserUpdate) -> UsersResult<User> {
        let uid = parse_id(&update.id)?;
        let mut username = supplied(update.username);
        let mut email = supplied(update.email);
        let mut phone = supplied(update.phone);
        let avatar = supplied(update.avatar);

        if username.is_none() && email.is_none() && phone.is_none() && avatar.is_none() {
            return Err(UsersError::InvalidArgument(
                "you must provide at least one field to update".into(),
            ));
        }

        if username.is_none() || email.is_none() || phone.is_none() {
            let old = self.repo.find_by_id(uid).await?;
            username = username.or(old.username);
            email = email.or(old.email);
            phone = phone.or(old.phone);
        }

        let updated = self
            .repo
            .update(UserChanges {
                id: uid,
                username,
                email,
                phone,
                avatar,
            })
            .await?;
        Ok(updated)
    }
}
