//! Per-user weekly configuration with optimistic update and revert.

use crate::client::api::{Api, ApiError};
use crate::models::{UpdateSettings, UserSettings};

pub struct SettingsStore<A> {
    api: A,
    settings: Option<UserSettings>,
    error: Option<String>,
    is_loading: bool,
}

impl<A: Api> SettingsStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            settings: None,
            error: None,
            is_loading: false,
        }
    }

    pub fn settings(&self) -> Option<&UserSettings> {
        self.settings.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// On failure the prior state stays untouched; only the error is
    /// recorded.
    pub async fn fetch(&mut self) -> Result<(), ApiError> {
        self.is_loading = true;
        self.error = None;
        match self.api.get_settings().await {
            Ok(settings) => {
                self.settings = Some(settings);
                self.is_loading = false;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.is_loading = false;
                Err(err)
            }
        }
    }

    /// No-op until settings have been loaded. The merged value is validated
    /// before any request goes out; on success local state is replaced with
    /// the server's authoritative row.
    pub async fn update(&mut self, patch: UpdateSettings) -> Result<(), ApiError> {
        let Some(current) = self.settings.clone() else {
            return Ok(());
        };

        let merged = patch.merged(&current);
        if let Err(message) = merged.validate() {
            self.error = Some(message.clone());
            return Err(ApiError::Invalid(message));
        }

        self.error = None;
        self.settings = Some(merged);

        match self.api.update_settings(&patch).await {
            Ok(server) => {
                self.settings = Some(server);
                Ok(())
            }
            Err(err) => {
                self.settings = Some(current);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
