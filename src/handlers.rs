use crate::auth::{self, AuthUser, SESSION_COOKIE};
use crate::errors::AppError;
use crate::models::{
    CreateRoutine, DayRequest, Envelope, LoginRequest, RoutineWithWeek, SessionResponse,
    SetDayRequest, UpdateRoutine, UpdateSettings, UserSettings, WeeklyData,
};
use crate::state::AppState;
use crate::stats::{self, current_week_start};
use crate::ui;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match auth::current_user(&state, &headers).await {
        Some(_) => Html(ui::render_dashboard()).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

pub async fn login_page() -> Html<&'static str> {
    Html(ui::LOGIN_HTML)
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("a valid email is required"));
    }

    let user_id = state.db.ensure_user(&email).await?;
    let token = state.sessions.issue(user_id).await;

    let mut response = Json(Envelope {
        data: SessionResponse { token, user_id },
    })
    .into_response();
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    response.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(AppError::internal)?,
    );
    Ok(response)
}

pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<UserSettings>>, AppError> {
    let settings = state.db.get_or_create_settings(user_id).await?;
    Ok(Json(Envelope { data: settings }))
}

pub async fn patch_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<UpdateSettings>,
) -> Result<Json<Envelope<UserSettings>>, AppError> {
    let current = state.db.get_or_create_settings(user_id).await?;
    patch
        .merged(&current)
        .validate()
        .map_err(AppError::bad_request)?;
    let settings = state.db.update_settings(user_id, &patch).await?;
    Ok(Json(Envelope { data: settings }))
}

pub async fn list_routines(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<Vec<RoutineWithWeek>>>, AppError> {
    let week_start = current_week_start();
    let routines = state.db.list_routines(user_id).await?;
    let weeks = state.db.week_rows(user_id, week_start).await?;

    let merged = routines
        .into_iter()
        .map(|routine| {
            let weekly_data = weeks.iter().find(|w| w.routine_id == routine.id).cloned();
            RoutineWithWeek {
                routine,
                weekly_data,
            }
        })
        .collect();
    Ok(Json(Envelope { data: merged }))
}

pub async fn create_routine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut req): Json<CreateRoutine>,
) -> Result<(StatusCode, Json<Envelope<RoutineWithWeek>>), AppError> {
    req.validate().map_err(AppError::bad_request)?;
    let routine = state.db.create_routine(user_id, &req).await?;

    // An empty current-week row rides along with the creation; losing it is
    // not fatal since the first increment creates one lazily anyway.
    let weekly_data = match state.db.create_week(routine.id, current_week_start()).await {
        Ok(week) => Some(week),
        Err(err) => {
            error!("failed to create weekly data for routine {}: {err}", routine.id);
            None
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            data: RoutineWithWeek {
                routine,
                weekly_data,
            },
        }),
    ))
}

pub async fn get_routine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<crate::models::Routine>>, AppError> {
    let routine = state.db.get_routine(user_id, id).await?;
    Ok(Json(Envelope { data: routine }))
}

pub async fn patch_routine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<UpdateRoutine>,
) -> Result<Json<Envelope<crate::models::Routine>>, AppError> {
    patch.validate().map_err(AppError::bad_request)?;
    let routine = state.db.update_routine(user_id, id, &patch).await?;
    Ok(Json(Envelope { data: routine }))
}

pub async fn delete_routine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.delete_routine(user_id, id).await?;
    Ok(Json(json!({ "message": "Routine deleted successfully" })))
}

pub async fn get_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(routine_id): Path<Uuid>,
) -> Result<Json<Envelope<WeeklyData>>, AppError> {
    let routine = state.db.get_routine(user_id, routine_id).await?;
    let week_start = current_week_start();
    let week = state
        .db
        .get_week(routine.id, week_start)
        .await?
        .unwrap_or_else(|| WeeklyData::zeroed(routine.id, week_start));
    Ok(Json(Envelope { data: week }))
}

pub async fn patch_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(routine_id): Path<Uuid>,
    Json(req): Json<SetDayRequest>,
) -> Result<Json<Envelope<WeeklyData>>, AppError> {
    let routine = state.db.get_routine(user_id, routine_id).await?;
    let week = state
        .db
        .set_day(routine.id, current_week_start(), req.day, req.value)
        .await?;
    Ok(Json(Envelope { data: week }))
}

pub async fn increment_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(routine_id): Path<Uuid>,
    Json(req): Json<DayRequest>,
) -> Result<Json<Envelope<WeeklyData>>, AppError> {
    let routine = state.db.get_routine(user_id, routine_id).await?;
    let week = state
        .db
        .increment_day(routine.id, current_week_start(), req.day)
        .await?;
    Ok(Json(Envelope { data: week }))
}

pub async fn decrement_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(routine_id): Path<Uuid>,
    Json(req): Json<DayRequest>,
) -> Result<Json<Envelope<WeeklyData>>, AppError> {
    let routine = state.db.get_routine(user_id, routine_id).await?;
    let week = state
        .db
        .decrement_day(routine.id, current_week_start(), req.day)
        .await?;
    Ok(Json(Envelope { data: week }))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub totals: stats::Totals,
    pub week: stats::WeekStats,
}

pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<StatsResponse>>, AppError> {
    let settings = state.db.get_or_create_settings(user_id).await?;
    let routines = state.db.list_routines(user_id).await?;
    let weeks = state.db.week_rows(user_id, current_week_start()).await?;

    let totals = stats::totals(
        routines.iter().map(|routine| {
            (
                routine.daily_average,
                weeks.iter().find(|w| w.routine_id == routine.id),
            )
        }),
        settings.work_days,
    );
    let week = stats::week_stats(&settings, &totals);
    Ok(Json(Envelope {
        data: StatsResponse { totals, week },
    }))
}
