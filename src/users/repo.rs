use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::users::{
    error::RepoError,
    model::{NewUser, User, UserChanges},
    querying::{PaginationParams, SortField, SortParams},
    repo_types::{UserRow, USER_COLUMNS},
};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence contract for users. Backends only see active records; how a
/// deleted record is kept (if at all) is up to the backend.
#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Stores a new user, assigning id and timestamps.
    async fn save(&self, user: NewUser) -> RepoResult<User>;
    /// Writes the supplied fields and refreshes `updated_at`.
    async fn update(&self, changes: UserChanges) -> RepoResult<User>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<User>;
    async fn list_all(&self, pp: PaginationParams, sp: SortParams) -> RepoResult<Vec<User>>;
    async fn delete(&self, id: Uuid) -> RepoResult<Uuid>;
    /// Number of active records, independent of any listing window.
    async fn count(&self) -> RepoResult<i64>;
}

/// Postgres backend. Deletes are soft: `deleted_at` is set and the row is
/// excluded from every read.
#[derive(Clone)]
pub struct PgUsersRepo {
    db: PgPool,
}

impl PgUsersRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// ORDER BY clause for a listing. Column names only ever come from `SortField`.
pub(crate) fn order_clause(pp: &PaginationParams, sp: &SortParams) -> RepoResult<String> {
    if sp.sort_by.is_empty() {
        let dir = if pp.reverse { "DESC" } else { "ASC" };
        return Ok(format!("created_at {dir}, id {dir}"));
    }
    let field = SortField::parse(&sp.sort_by)
        .ok_or_else(|| RepoError::UnsupportedSort(sp.sort_by.clone()))?;
    Ok(format!("{} {}, id ASC", field.column(), sp.direction().as_sql()))
}

#[async_trait]
impl UsersRepo for PgUsersRepo {
    #[instrument(name = "data.save", skip_all)]
    async fn save(&self, user: NewUser) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, phone, avatar) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.phone)
            .bind(user.avatar)
            .fetch_one(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;
        debug!(user_id = %row.id, "user inserted");
        Ok(row.into())
    }

    #[instrument(name = "data.update", skip_all, fields(user_id = %changes.id))]
    async fn update(&self, changes: UserChanges) -> RepoResult<User> {
        let sql = format!(
            "UPDATE users SET \
                 username = COALESCE($2, username), \
                 email = COALESCE($3, email), \
                 phone = COALESCE($4, phone), \
                 avatar = COALESCE($5, avatar), \
                 updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(changes.id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.phone)
            .bind(changes.avatar)
            .fetch_optional(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?
            .ok_or(RepoError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(name = "data.find_by_id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?
            .ok_or(RepoError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(name = "data.list_all", skip(self))]
    async fn list_all(&self, pp: PaginationParams, sp: SortParams) -> RepoResult<Vec<User>> {
        let order = order_clause(&pp, &sp)?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE deleted_at IS NULL \
             ORDER BY {order} \
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(pp.limit())
            .bind(pp.offset())
            .fetch_all(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(name = "data.delete", skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<Uuid> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET deleted_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(id)
    }

    #[instrument(name = "data.count", skip(self))]
    async fn count(&self) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM users WHERE deleted_at IS NULL"#,
        )
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;
        Ok(count)
    }
}
