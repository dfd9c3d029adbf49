//! Relational store for routines, weekly rows and per-user settings,
//! backed by SQLite. Every query is scoped to the owning user; weekly rows
//! are owned by their routine and removed with it via cascade.

pub mod queries;

use crate::models::{
    CreateRoutine, DayOfWeek, Routine, UpdateRoutine, UpdateSettings, UserSettings, WeeklyData,
};
use chrono::{DateTime, NaiveDate, Utc};
use queries::*;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fmt};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub fn resolve_db_path() -> PathBuf {
    if let Ok(path) = env::var("ROUTINE_DB_PATH") {
        return PathBuf::from(path);
    }
    PathBuf::from("data/routine.db")
}

#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Db")
    }
}

impl Db {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute(SQL_CREATE_USERS, ())?;
        conn.execute(SQL_CREATE_SETTINGS, ())?;
        conn.execute(SQL_CREATE_ROUTINES, ())?;
        conn.execute(SQL_CREATE_WEEKLY, ())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Look up a user by email, creating the row on first sight.
    pub async fn ensure_user(&self, email: &str) -> Result<Uuid, DbError> {
        let conn = self.conn.lock().await;
        let existing: Option<Uuid> = conn
            .query_row("SELECT id FROM users WHERE email = ?1", params![email], |row| {
                uuid_col(row, 0)
            })
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
            params![id.to_string(), email, Utc::now().to_rfc3339()],
        )?;
        Ok(id)
    }

    /// Settings are a per-user singleton, created with defaults
    /// (7 available days, 5 work days, 8 hours, UTC) on first access.
    pub async fn get_or_create_settings(&self, user_id: Uuid) -> Result<UserSettings, DbError> {
        let conn = self.conn.lock().await;
        let existing = conn
            .query_row(
                &format!("SELECT {SETTINGS_COLS} FROM user_settings WHERE user_id = ?1"),
                params![user_id.to_string()],
                settings_from_row,
            )
            .optional()?;
        if let Some(settings) = existing {
            return Ok(settings);
        }

        let now = Utc::now();
        let settings = UserSettings {
            id: Uuid::new_v4(),
            user_id,
            available_days: 7,
            work_days: 5,
            work_hours_day: 8,
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        };
        conn.execute(
            "INSERT INTO user_settings (id, user_id, available_days, work_days, work_hours_day, \
             timezone, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                settings.id.to_string(),
                settings.user_id.to_string(),
                settings.available_days,
                settings.work_days,
                settings.work_hours_day,
                settings.timezone,
                settings.created_at.to_rfc3339(),
                settings.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(settings)
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        patch: &UpdateSettings,
    ) -> Result<UserSettings, DbError> {
        let conn = self.conn.lock().await;
        let current = conn
            .query_row(
                &format!("SELECT {SETTINGS_COLS} FROM user_settings WHERE user_id = ?1"),
                params![user_id.to_string()],
                settings_from_row,
            )
            .optional()?
            .ok_or(DbError::NotFound)?;

        let merged = patch.merged(&current);
        conn.execute(
            "UPDATE user_settings SET available_days = ?1, work_days = ?2, work_hours_day = ?3, \
             timezone = ?4, updated_at = ?5 WHERE user_id = ?6",
            params![
                merged.available_days,
                merged.work_days,
                merged.work_hours_day,
                merged.timezone,
                merged.updated_at.to_rfc3339(),
                user_id.to_string(),
            ],
        )?;
        Ok(merged)
    }

    pub async fn list_routines(&self, user_id: Uuid) -> Result<Vec<Routine>, DbError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ROUTINE_COLS} FROM routines WHERE user_id = ?1 ORDER BY sort_order ASC"
        ))?;
        let rows = stmt.query_map(params![user_id.to_string()], routine_from_row)?;
        let mut routines = Vec::new();
        for routine in rows {
            routines.push(routine?);
        }
        Ok(routines)
    }

    pub async fn get_routine(&self, user_id: Uuid, id: Uuid) -> Result<Routine, DbError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {ROUTINE_COLS} FROM routines WHERE id = ?1 AND user_id = ?2"),
            params![id.to_string(), user_id.to_string()],
            routine_from_row,
        )
        .optional()?
        .ok_or(DbError::NotFound)
    }

    /// Insert with the next sort order (max + 1, or 0 when the list is
    /// empty). A duplicate name for the same user maps to `Conflict`.
    pub async fn create_routine(
        &self,
        user_id: Uuid,
        req: &CreateRoutine,
    ) -> Result<Routine, DbError> {
        let conn = self.conn.lock().await;
        let sort_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM routines WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;

        let now = Utc::now();
        let routine = Routine {
            id: Uuid::new_v4(),
            user_id,
            name: req.name.clone(),
            daily_average: req.daily_average,
            comments: req.comments.clone(),
            sort_order,
            created_at: now,
            updated_at: now,
        };
        conn.execute(
            "INSERT INTO routines (id, user_id, name, daily_average, comments, sort_order, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                routine.id.to_string(),
                routine.user_id.to_string(),
                routine.name,
                routine.daily_average,
                routine.comments,
                routine.sort_order,
                routine.created_at.to_rfc3339(),
                routine.updated_at.to_rfc3339(),
            ],
        )
        .map_err(name_conflict)?;
        Ok(routine)
    }

    pub async fn update_routine(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &UpdateRoutine,
    ) -> Result<Routine, DbError> {
        let conn = self.conn.lock().await;
        let mut routine = conn
            .query_row(
                &format!("SELECT {ROUTINE_COLS} FROM routines WHERE id = ?1 AND user_id = ?2"),
                params![id.to_string(), user_id.to_string()],
                routine_from_row,
            )
            .optional()?
            .ok_or(DbError::NotFound)?;

        patch.apply_to(&mut routine);
        conn.execute(
            "UPDATE routines SET name = ?1, daily_average = ?2, comments = ?3, updated_at = ?4 \
             WHERE id = ?5 AND user_id = ?6",
            params![
                routine.name,
                routine.daily_average,
                routine.comments,
                routine.updated_at.to_rfc3339(),
                id.to_string(),
                user_id.to_string(),
            ],
        )
        .map_err(name_conflict)?;
        Ok(routine)
    }

    /// Cascade removes the routine's weekly rows with it.
    pub async fn delete_routine(&self, user_id: Uuid, id: Uuid) -> Result<(), DbError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM routines WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn week_rows(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Vec<WeeklyData>, DbError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(SQL_WEEKS_FOR_USER)?;
        let rows = stmt.query_map(
            params![user_id.to_string(), week_start.to_string()],
            week_from_row,
        )?;
        let mut weeks = Vec::new();
        for week in rows {
            weeks.push(week?);
        }
        Ok(weeks)
    }

    pub async fn get_week(
        &self,
        routine_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyData>, DbError> {
        let conn = self.conn.lock().await;
        Ok(select_week(&conn, routine_id, week_start)?)
    }

    /// Empty current-week row created alongside a new routine.
    pub async fn create_week(
        &self,
        routine_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<WeeklyData, DbError> {
        let conn = self.conn.lock().await;
        Ok(insert_week(&conn, routine_id, week_start, None)?)
    }

    /// The first point logged in a week creates the row lazily with the
    /// target day at 1 and every other day at 0.
    pub async fn increment_day(
        &self,
        routine_id: Uuid,
        week_start: NaiveDate,
        day: DayOfWeek,
    ) -> Result<WeeklyData, DbError> {
        let conn = self.conn.lock().await;
        match select_week(&conn, routine_id, week_start)? {
            Some(week) => {
                let value = week.day(day) + 1;
                Ok(write_day(&conn, week, day, value)?)
            }
            None => Ok(insert_week(&conn, routine_id, week_start, Some((day, 1)))?),
        }
    }

    /// Day counters are natural numbers: decrementing a missing row answers
    /// the all-zero placeholder without inserting anything, and an existing
    /// counter never goes below 0.
    pub async fn decrement_day(
        &self,
        routine_id: Uuid,
        week_start: NaiveDate,
        day: DayOfWeek,
    ) -> Result<WeeklyData, DbError> {
        let conn = self.conn.lock().await;
        match select_week(&conn, routine_id, week_start)? {
            Some(week) => {
                let value = week.day(day).saturating_sub(1);
                Ok(write_day(&conn, week, day, value)?)
            }
            None => Ok(WeeklyData::zeroed(routine_id, week_start)),
        }
    }

    /// Direct set of one day's counter, upserting the week row.
    pub async fn set_day(
        &self,
        routine_id: Uuid,
        week_start: NaiveDate,
        day: DayOfWeek,
        value: u32,
    ) -> Result<WeeklyData, DbError> {
        let conn = self.conn.lock().await;
        match select_week(&conn, routine_id, week_start)? {
            Some(week) => Ok(write_day(&conn, week, day, value)?),
            None => Ok(insert_week(&conn, routine_id, week_start, Some((day, value)))?),
        }
    }
}

fn select_week(
    conn: &Connection,
    routine_id: Uuid,
    week_start: NaiveDate,
) -> rusqlite::Result<Option<WeeklyData>> {
    conn.query_row(
        &format!(
            "SELECT {WEEK_COLS} FROM weekly_data WHERE routine_id = ?1 AND week_start = ?2"
        ),
        params![routine_id.to_string(), week_start.to_string()],
        week_from_row,
    )
    .optional()
}

fn insert_week(
    conn: &Connection,
    routine_id: Uuid,
    week_start: NaiveDate,
    day: Option<(DayOfWeek, u32)>,
) -> rusqlite::Result<WeeklyData> {
    let mut week = WeeklyData::zeroed(routine_id, week_start);
    week.id = Uuid::new_v4();
    if let Some((day, value)) = day {
        *week.day_mut(day) = value;
    }
    conn.execute(
        SQL_INSERT_WEEK,
        params![
            week.id.to_string(),
            week.routine_id.to_string(),
            week.week_start.to_string(),
            week.monday,
            week.tuesday,
            week.wednesday,
            week.thursday,
            week.friday,
            week.saturday,
            week.sunday,
            week.created_at.to_rfc3339(),
            week.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(week)
}

fn write_day(
    conn: &Connection,
    mut week: WeeklyData,
    day: DayOfWeek,
    value: u32,
) -> rusqlite::Result<WeeklyData> {
    *week.day_mut(day) = value;
    week.updated_at = Utc::now();
    conn.execute(
        &format!(
            "UPDATE weekly_data SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            day.as_str()
        ),
        params![value, week.updated_at.to_rfc3339(), week.id.to_string()],
    )?;
    Ok(week)
}

fn name_conflict(err: rusqlite::Error) -> DbError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            return DbError::Conflict("A routine with this name already exists".to_string());
        }
    }
    DbError::Sqlite(err)
}

fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn routine_from_row(row: &Row<'_>) -> rusqlite::Result<Routine> {
    Ok(Routine {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        name: row.get(2)?,
        daily_average: row.get(3)?,
        comments: row.get(4)?,
        sort_order: row.get(5)?,
        created_at: ts_col(row, 6)?,
        updated_at: ts_col(row, 7)?,
    })
}

fn week_from_row(row: &Row<'_>) -> rusqlite::Result<WeeklyData> {
    Ok(WeeklyData {
        id: uuid_col(row, 0)?,
        routine_id: uuid_col(row, 1)?,
        week_start: date_col(row, 2)?,
        monday: row.get(3)?,
        tuesday: row.get(4)?,
        wednesday: row.get(5)?,
        thursday: row.get(6)?,
        friday: row.get(7)?,
        saturday: row.get(8)?,
        sunday: row.get(9)?,
        created_at: ts_col(row, 10)?,
        updated_at: ts_col(row, 11)?,
    })
}

fn settings_from_row(row: &Row<'_>) -> rusqlite::Result<UserSettings> {
    Ok(UserSettings {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        available_days: row.get(2)?,
        work_days: row.get(3)?,
        work_hours_day: row.get(4)?,
        timezone: row.get(5)?,
        created_at: ts_col(row, 6)?,
        updated_at: ts_col(row, 7)?,
    })
}
