//! SQL text for the relational store. Kept in one place so the schema and
//! the queries that depend on it stay in sync.

pub const SQL_CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
)";

pub const SQL_CREATE_SETTINGS: &str = "CREATE TABLE IF NOT EXISTS user_settings (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    available_days INTEGER NOT NULL,
    work_days INTEGER NOT NULL,
    work_hours_day INTEGER NOT NULL,
    timezone TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub const SQL_CREATE_ROUTINES: &str = "CREATE TABLE IF NOT EXISTS routines (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    daily_average INTEGER NOT NULL,
    comments TEXT,
    sort_order INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, name)
)";

pub const SQL_CREATE_WEEKLY: &str = "CREATE TABLE IF NOT EXISTS weekly_data (
    id TEXT PRIMARY KEY,
    routine_id TEXT NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
    week_start TEXT NOT NULL,
    monday INTEGER NOT NULL DEFAULT 0,
    tuesday INTEGER NOT NULL DEFAULT 0,
    wednesday INTEGER NOT NULL DEFAULT 0,
    thursday INTEGER NOT NULL DEFAULT 0,
    friday INTEGER NOT NULL DEFAULT 0,
    saturday INTEGER NOT NULL DEFAULT 0,
    sunday INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (routine_id, week_start)
)";

pub const ROUTINE_COLS: &str =
    "id, user_id, name, daily_average, comments, sort_order, created_at, updated_at";

pub const WEEK_COLS: &str = "id, routine_id, week_start, monday, tuesday, wednesday, thursday, \
                             friday, saturday, sunday, created_at, updated_at";

pub const SETTINGS_COLS: &str =
    "id, user_id, available_days, work_days, work_hours_day, timezone, created_at, updated_at";

/// Current-week rows for every routine owned by one user.
pub const SQL_WEEKS_FOR_USER: &str = "SELECT w.id, w.routine_id, w.week_start, w.monday, \
    w.tuesday, w.wednesday, w.thursday, w.friday, w.saturday, w.sunday, w.created_at, \
    w.updated_at FROM weekly_data w JOIN routines r ON r.id = w.routine_id \
    WHERE r.user_id = ?1 AND w.week_start = ?2";

pub const SQL_INSERT_WEEK: &str = "INSERT INTO weekly_data (id, routine_id, week_start, monday, \
    tuesday, wednesday, thursday, friday, saturday, sunday, created_at, updated_at) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
