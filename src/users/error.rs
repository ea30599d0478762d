use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Failures reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("unsupported sort field: {0}")]
    UnsupportedSort(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl RepoError {
    /// Maps driver errors, turning unique index violations into `Conflict`.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepoError::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            other => RepoError::Database(other),
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::from_sqlx(e)
    }
}

/// Errors surfaced by the users usecase.
#[derive(Debug, thiserror::Error)]
pub enum UsersError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(#[source] RepoError),
}

impl From<RepoError> for UsersError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => UsersError::NotFound("user not found".into()),
            RepoError::UnsupportedSort(field) => {
                UsersError::BadRequest(format!("unsupported sort field: {field}"))
            }
            other => UsersError::Storage(other),
        }
    }
}

impl UsersError {
    pub fn status(&self) -> StatusCode {
        match self {
            UsersError::InvalidArgument(_) | UsersError::BadRequest(_) => StatusCode::BAD_REQUEST,
            UsersError::NotFound(_) => StatusCode::NOT_FOUND,
            UsersError::Storage(RepoError::Conflict(_)) => StatusCode::CONFLICT,
            UsersError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UsersError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            UsersError::Storage(RepoError::Database(_)) => "internal storage error".to_string(),
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_usecase_kinds() {
        assert!(matches!(UsersError::from(RepoError::NotFound), UsersError::NotFound(_)));
        assert!(matches!(
            UsersError::from(RepoError::UnsupportedSort("nope".into())),
            UsersError::BadRequest(_)
        ));
        assert!(matches!(
            UsersError::from(RepoError::Conflict("users_email_key".into())),
            UsersError::Storage(RepoError::Conflict(_))
        ));
    }

    #[test]
    fn status_codes() {
        assert_eq!(UsersError::InvalidArgument("id".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(UsersError::BadRequest("sort".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(UsersError::NotFound("user".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            UsersError::Storage(RepoError::Conflict("users_email_key".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            UsersError::Storage(RepoError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn question_mark_conversion_keeps_not_found() {
        fn lookup() -> Result<(), RepoError> {
            let res: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
            res?;
            Ok(())
        }
        assert!(matches!(lookup(), Err(RepoError::NotFound)));
        assert!(matches!(
            RepoError::from(sqlx::Error::PoolTimedOut),
            RepoError::Database(_)
        ));
    }

    #[test]
    fn row_not_found_is_not_found() {
        assert!(matches!(RepoError::from_sqlx(sqlx::Error::RowNotFound), RepoError::NotFound));
        assert!(matches!(
            RepoError::from_sqlx(sqlx::Error::PoolClosed),
            RepoError::Database(_)
        ));
    }
}
