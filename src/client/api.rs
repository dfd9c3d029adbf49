use crate::models::{
    CreateRoutine, DayOfWeek, Envelope, Routine, RoutineWithWeek, SetDayRequest, UpdateRoutine,
    UpdateSettings, UserSettings, WeeklyData,
};
use crate::retry::{with_retry, RetryPolicy};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status; `message` carries the
    /// `{ "error": … }` body when one was sent.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    /// Rejected client-side before any request was issued.
    #[error("{0}")]
    Invalid(String),
}

/// Network surface the stores talk to. Abstracted so store behavior can be
/// exercised against a scripted transport.
#[allow(async_fn_in_trait)]
pub trait Api {
    async fn list_routines(&self) -> Result<Vec<RoutineWithWeek>, ApiError>;
    async fn create_routine(&self, req: &CreateRoutine) -> Result<RoutineWithWeek, ApiError>;
    async fn update_routine(&self, id: Uuid, patch: &UpdateRoutine) -> Result<Routine, ApiError>;
    async fn delete_routine(&self, id: Uuid) -> Result<(), ApiError>;
    async fn increment_day(&self, routine_id: Uuid, day: DayOfWeek)
        -> Result<WeeklyData, ApiError>;
    async fn decrement_day(&self, routine_id: Uuid, day: DayOfWeek)
        -> Result<WeeklyData, ApiError>;
    async fn set_day(
        &self,
        routine_id: Uuid,
        day: DayOfWeek,
        value: u32,
    ) -> Result<WeeklyData, ApiError>;
    async fn get_settings(&self) -> Result<UserSettings, ApiError>;
    async fn update_settings(&self, patch: &UpdateSettings) -> Result<UserSettings, ApiError>;
}

/// reqwest-backed transport. Every call runs under the retry policy;
/// server errors (>= 500) and transport failures are retried, anything
/// else is final.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: Uuid,
    policy: RetryPolicy,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token: Uuid) -> Self {
        Self::with_policy(base_url, token, RetryPolicy::default())
    }

    pub fn with_policy(base_url: impl Into<String>, token: Uuid, policy: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
            policy,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = with_retry(&self.policy, || async {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header(AUTHORIZATION, format!("Bearer {}", self.token));
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request
                .send()
                .await
                .map_err(|err| ApiError::Network(err.to_string()))?;
            if response.status().is_server_error() {
                return Err(status_error(response).await);
            }
            Ok(response)
        })
        .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(envelope.data)
    }
}

async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    };
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|err| ApiError::Invalid(err.to_string()))
}

impl Api for HttpApi {
    async fn list_routines(&self) -> Result<Vec<RoutineWithWeek>, ApiError> {
        self.json(Method::GET, "/api/routines", None).await
    }

    async fn create_routine(&self, req: &CreateRoutine) -> Result<RoutineWithWeek, ApiError> {
        let body = to_body(req)?;
        self.json(Method::POST, "/api/routines", Some(&body)).await
    }

    async fn update_routine(&self, id: Uuid, patch: &UpdateRoutine) -> Result<Routine, ApiError> {
        let body = to_body(patch)?;
        self.json(Method::PATCH, &format!("/api/routines/{id}"), Some(&body))
            .await
    }

    async fn delete_routine(&self, id: Uuid) -> Result<(), ApiError> {
        self.send(Method::DELETE, &format!("/api/routines/{id}"), None)
            .await?;
        Ok(())
    }

    async fn increment_day(
        &self,
        routine_id: Uuid,
        day: DayOfWeek,
    ) -> Result<WeeklyData, ApiError> {
        let body = json!({ "day": day });
        self.json(
            Method::POST,
            &format!("/api/weekly-data/{routine_id}/increment"),
            Some(&body),
        )
        .await
    }

    async fn decrement_day(
        &self,
        routine_id: Uuid,
        day: DayOfWeek,
    ) -> Result<WeeklyData, ApiError> {
        let body = json!({ "day": day });
        self.json(
            Method::POST,
            &format!("/api/weekly-data/{routine_id}/decrement"),
            Some(&body),
        )
        .await
    }

    async fn set_day(
        &self,
        routine_id: Uuid,
        day: DayOfWeek,
        value: u32,
    ) -> Result<WeeklyData, ApiError> {
        let body = to_body(&SetDayRequest { day, value })?;
        self.json(
            Method::PATCH,
            &format!("/api/weekly-data/{routine_id}"),
            Some(&body),
        )
        .await
    }

    async fn get_settings(&self) -> Result<UserSettings, ApiError> {
        self.json(Method::GET, "/api/settings", None).await
    }

    async fn update_settings(&self, patch: &UpdateSettings) -> Result<UserSettings, ApiError> {
        let body = to_body(patch)?;
        self.json(Method::PATCH, "/api/settings", Some(&body)).await
    }
}
