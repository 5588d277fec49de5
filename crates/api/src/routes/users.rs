//! User and invitation routes.
//!
//! Merged (not nested) because they span two top-level prefixes:
//! `/users` and `/invitations`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// GET    /users                     list_users
/// POST   /users                     create_user
/// GET    /users/{user_id}           get_user
/// PATCH  /users/{user_id}           update_user
/// DELETE /users/{user_id}           deactivate_user
///
/// GET    /invitations               list_invitations
/// POST   /invitations               invite_user
/// POST   /invitations/accept        accept_invitation (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::deactivate_user),
        )
        .route(
            "/invitations",
            get(users::list_invitations).post(users::invite_user),
        )
        .route("/invitations/accept", post(users::accept_invitation))
}
