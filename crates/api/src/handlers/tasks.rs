//! Handlers for tasks.
//!
//! Listing returns dispatch order (priority rank, then due date); overdue
//! is computed in SQL against the database clock at query time.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::str::FromStr;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::Permission;
use veriguard_core::tasks::{TaskPriority, TaskStatus};
use veriguard_core::types::DbId;
use veriguard_db::models::task::{CreateTask, Task, UpdateTask};
use veriguard_db::repositories::TaskRepo;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::TaskListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tasks
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::TaskCreate, org_id).await?;

    let details = json!({"title": &input.title, "assigned_to": input.assigned_to});
    let result = async {
        input.validate()?;
        if let Some(priority) = &input.priority {
            TaskPriority::from_str(priority)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        }
        Ok(TaskRepo::create(&state.pool, org_id, Some(auth.user_id), &input).await?)
    }
    .await;

    let task = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "task",
        details,
        result,
        |t: &Task| Some(t.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::TaskView, org_id).await?;

    let tasks = TaskRepo::list_for_org(
        &state.pool,
        org_id,
        params.status.as_deref(),
        params.assigned_to,
        veriguard_db::clamp_limit(params.limit),
        veriguard_db::clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/overdue
pub async fn list_overdue(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::TaskView, org_id).await?;

    let tasks = TaskRepo::list_overdue(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{task_id}
pub async fn get_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::TaskView, org_id).await?;

    let task = TaskRepo::find_scoped(&state.pool, task_id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })
        })?;

    Ok(Json(DataResponse { data: task }))
}

/// PATCH /api/v1/tasks/{task_id}
///
/// Update task fields. Reassignment requires `TaskAssign` on top of
/// `TaskUpdate`.
pub async fn update_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    let needed = if input.assigned_to.is_some() {
        Permission::TaskAssign
    } else {
        Permission::TaskUpdate
    };
    require_permission(&state, &auth, needed, org_id).await?;

    let details = json!({"fields": &input});
    let result = async {
        if let Some(priority) = &input.priority {
            TaskPriority::from_str(priority)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        }
        if let Some(status) = &input.status {
            TaskStatus::from_str(status)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        }
        TaskRepo::update(&state.pool, task_id, org_id, &input)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Task",
                    id: task_id,
                })
            })
    }
    .await;

    let task = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "task",
        details,
        result,
        |t: &Task| Some(t.id),
    )
    .await?;

    Ok(Json(DataResponse { data: task }))
}
