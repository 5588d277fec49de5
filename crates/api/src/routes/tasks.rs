//! Task routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// ```text
/// GET    /                     list_tasks (dispatch order)
/// POST   /                     create_task
/// GET    /overdue              list_overdue
/// GET    /{task_id}            get_task
/// PATCH  /{task_id}            update_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/overdue", get(tasks::list_overdue))
        .route(
            "/{task_id}",
            get(tasks::get_task).patch(tasks::update_task),
        )
}
