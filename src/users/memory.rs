use std::cmp::Ordering;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::{
    error::RepoError,
    model::{NewUser, User, UserChanges},
    querying::{PaginationParams, SortField, SortOrder, SortParams},
    repo::{RepoResult, UsersRepo},
};

/// Process-local backend kept in insertion order. Deletes are soft, like the
/// Postgres backend: `deleted_at` is set and the record drops out of every read.
#[derive(Default)]
pub struct InMemoryUsersRepo {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if !a.is_empty() && a == b)
}

/// Name of the first unique field `candidate` shares with another active user.
fn conflict(users: &[User], skip: Option<Uuid>, candidate: &User) -> Option<&'static str> {
    users
        .iter()
        .filter(|u| u.is_active() && Some(u.id) != skip)
        .find_map(|u| {
            if clashes(&u.username, &candidate.username) {
                Some("username")
            } else if clashes(&u.email, &candidate.email) {
                Some("email")
            } else if clashes(&u.phone, &candidate.phone) {
                Some("phone")
            } else {
                None
            }
        })
}

/// `updated_at` always moves forward, even when the clock has not ticked.
fn refreshed(previous: OffsetDateTime) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn compare(a: &User, b: &User, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Username => a.username.cmp(&b.username),
        SortField::Email => a.email.cmp(&b.email),
        SortField::Phone => a.phone.cmp(&b.phone),
        SortField::Avatar => a.avatar.cmp(&b.avatar),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl UsersRepo for InMemoryUsersRepo {
    async fn save(&self, user: NewUser) -> RepoResult<User> {
        let mut users = self.users.write().await;
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            phone: user.phone,
            avatar: user.avatar,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        if let Some(field) = conflict(&users, None, &created) {
            return Err(RepoError::Conflict(field.into()));
        }
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, changes: UserChanges) -> RepoResult<User> {
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|u| u.id == changes.id && u.is_active())
            .ok_or(RepoError::NotFound)?;

        let mut next = users[idx].clone();
        if let Some(v) = changes.username {
            next.username = Some(v);
        }
        if let Some(v) = changes.email {
            next.email = Some(v);
        }
        if let Some(v) = changes.phone {
            next.phone = Some(v);
        }
        if let Some(v) = changes.avatar {
            next.avatar = Some(v);
        }
        if let Some(field) = conflict(&users, Some(next.id), &next) {
            return Err(RepoError::Conflict(field.into()));
        }
        next.updated_at = refreshed(users[idx].updated_at);
        users[idx] = next.clone();
        Ok(next)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<User> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.id == id && u.is_active())
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn list_all(&self, pp: PaginationParams, sp: SortParams) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        let mut active: Vec<User> = users.iter().filter(|u| u.is_active()).cloned().collect();

        if sp.sort_by.is_empty() {
            if pp.reverse {
                active.reverse();
            }
        } else {
            let field = SortField::parse(&sp.sort_by)
                .ok_or_else(|| RepoError::UnsupportedSort(sp.sort_by.clone()))?;
            let order = sp.direction();
            // stable sort keeps insertion order among equal keys
            active.sort_by(|a, b| {
                let ord = compare(a, b, field);
                if order == SortOrder::Desc {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        let offset = usize::try_from(pp.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pp.limit()).unwrap_or(0);
        Ok(active.into_iter().skip(offset).take(limit).collect())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<Uuid> {
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|u| u.id == id && u.is_active())
            .ok_or(RepoError::NotFound)?;
        users[idx].deleted_at = Some(OffsetDateTime::now_utc());
        Ok(id)
    }

    async fn count(&self) -> RepoResult<i64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.is_active()).count() as i64)
    }
}
