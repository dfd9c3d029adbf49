//! Client-side state layer: typed stores mirroring the server's data with
//! optimistic updates, snapshot revert and retried transport.

pub mod api;
pub mod routines;
pub mod settings;

pub use api::{Api, ApiError, HttpApi};
pub use routines::{RoutineView, RoutinesStore};
pub use settings::SettingsStore;
