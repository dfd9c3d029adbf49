use crate::auth::Sessions;
use crate::db::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub sessions: Sessions,
}

impl AppState {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            sessions: Sessions::default(),
        }
    }
}
