use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, DeleteUserReply, ListUsersQuery, ListUsersReply,
            UpdateUserRequest, UserReply,
        },
        error::UsersError,
        model::UserUpdate,
    },
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserReply>), UsersError> {
    let user = state.users.create_user(payload.into()).await.map_err(|e| {
        warn!(error = %e, "create_user failed");
        e
    })?;
    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserReply>, UsersError> {
    let user = state.users.get_by_id(&id).await.map_err(|e| {
        warn!(error = %e, %id, "get_user failed");
        e
    })?;
    info!(user_id = %user.id, "user fetched");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserReply>, UsersError> {
    let update = UserUpdate {
        id: id.clone(),
        username: payload.username,
        email: payload.email,
        phone: payload.phone,
        avatar: payload.avatar,
    };
    let user = state.users.update_user(update).await.map_err(|e| {
        warn!(error = %e, %id, "update_user failed");
        e
    })?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserReply>, UsersError> {
    let id = state.users.delete_user(&id).await.map_err(|e| {
        warn!(error = %e, %id, "delete_user failed");
        e
    })?;
    info!(user_id = %id, "user deleted");
    Ok(Json(DeleteUserReply { id }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersReply>, UsersError> {
    let (pp, sp) = query.into_params();
    let res = state.users.list_users(pp, sp).await.map_err(|e| {
        warn!(error = %e, "list_users failed");
        e
    })?;
    info!(count = res.users.len(), "users listed");
    Ok(Json(res.into()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    fn app() -> Router {
        build_app(AppState::fake())
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn create_get_update_delete_over_http() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/users",
            Some(json!({"username": "alice", "email": "alice@example.com", "phone": "+15550001"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Value = serde_json::from_slice(&body).unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["username"], "alice");

        let (status, body) = send(&app, Method::GET, &format!("/api/v1/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let fetched: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(fetched["email"], "alice@example.com");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/users/{id}"),
            Some(json!({"email": "new@x.com", "username": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated["username"], "alice");
        assert_eq!(updated["phone"], "+15550001");
        assert_eq!(updated["email"], "new@x.com");

        let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let deleted: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(deleted["id"], id.as_str());

        let (status, _) = send(&app, Method::GET, &format!("/api/v1/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let app = app();
        let body = json!({"username": "bob", "email": "bob@example.com"});
        let (status, _) = send(&app, Method::POST, "/api/v1/users", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, Method::POST, "/api/v1/users", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/api/v1/users/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::DELETE, "/api/v1/users/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_reports_page_and_table_counts() {
        let app = app();
        for n in 0..3 {
            let body = json!({"username": format!("u{n}"), "email": format!("u{n}@example.com")});
            send(&app, Method::POST, "/api/v1/users", Some(body)).await;
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/users?page=0&page_size=2&sort_by=username&sort_order=desc",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let list: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(list["total"], 2);
        assert_eq!(list["total_pages"], 3);
        assert_eq!(list["page_size"], 2);
        assert_eq!(list["users"][0]["username"], "u2");

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/users?sort_by=username&sort_order=sideways",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_defaults_out_of_range_pagination() {
        let app = app();
        let uri = "/api/v1/users?page=-4&page_size=0";
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let list: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(list["page"], 0);
        assert_eq!(list["page_size"], 20);
        assert_eq!(list["total"], 0);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }
}
