use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/settings",
            get(handlers::get_settings).patch(handlers::patch_settings),
        )
        .route(
            "/api/routines",
            get(handlers::list_routines).post(handlers::create_routine),
        )
        .route(
            "/api/routines/:id",
            get(handlers::get_routine)
                .patch(handlers::patch_routine)
                .delete(handlers::delete_routine),
        )
        .route(
            "/api/weekly-data/:routine_id",
            get(handlers::get_week).patch(handlers::patch_week),
        )
        .route(
            "/api/weekly-data/:routine_id/increment",
            post(handlers::increment_day),
        )
        .route(
            "/api/weekly-data/:routine_id/decrement",
            post(handlers::decrement_day),
        )
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
