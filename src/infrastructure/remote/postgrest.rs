use crate::application::ports::{RemoteError, RemoteStore};
use crate::domain::value_objects::{RowId, ROW_ID_FIELD};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;

/// Supabase/PostgREST の単一テーブルに対する CRUD。
pub struct PostgrestRemoteStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PostgrestRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let base = config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(AppError::ConfigurationError(
                "Remote base URL is not configured".to_string(),
            ));
        }
        if config.table.trim().is_empty() {
            return Err(AppError::ConfigurationError(
                "Remote table is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| {
                AppError::ConfigurationError(format!("Failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{base}/rest/v1/{}", config.table.trim()),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            return request;
        }
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn row_filter(id: &RowId) -> [(&'static str, String); 1] {
        [(ROW_ID_FIELD, format!("eq.{id}"))]
    }

    async fn send(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, RemoteError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = map_status(status, body);
        tracing::debug!(
            target: "remote::postgrest",
            method,
            status = status.as_u16(),
            error = %error,
            "remote request failed"
        );
        Err(error)
    }
}

#[async_trait]
impl RemoteStore for PostgrestRemoteStore {
    async fn create(&self, fields: Map<String, Value>) -> Result<Option<RowId>, RemoteError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=representation")
            .json(&Value::Array(vec![Value::Object(fields)]));
        let response = self.send("POST", request).await?;

        // 2xx なら行は作成済み。本文を解釈できなくても成功を返す
        let row_id = match response.text().await {
            Ok(body) => created_row_id(&body),
            Err(err) => {
                tracing::warn!(
                    target: "remote::postgrest",
                    error = %err,
                    "failed to read create response; created row id unknown"
                );
                None
            }
        };

        if let Some(id) = &row_id {
            tracing::debug!(target: "remote::postgrest", row_id = %id, "row created");
        }
        Ok(row_id)
    }

    async fn update(&self, id: &RowId, patch: Map<String, Value>) -> Result<(), RemoteError> {
        let request = self
            .client
            .patch(&self.endpoint)
            .query(&Self::row_filter(id))
            .json(&Value::Object(patch));
        self.send("PATCH", request).await?;

        tracing::debug!(target: "remote::postgrest", row_id = %id, "row updated");
        Ok(())
    }

    async fn delete(&self, id: &RowId) -> Result<(), RemoteError> {
        let request = self.client.delete(&self.endpoint).query(&Self::row_filter(id));
        self.send("DELETE", request).await?;

        tracing::debug!(target: "remote::postgrest", row_id = %id, "row deleted");
        Ok(())
    }
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Network(err.to_string())
    }
}

fn map_status(status: StatusCode, body: String) -> RemoteError {
    let code = status.as_u16();
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || !status.is_client_error()
    {
        RemoteError::Unavailable { status: code }
    } else {
        RemoteError::Rejected {
            status: code,
            message: body,
        }
    }
}

// return=representation は作成行の配列を返す。空ボディや解釈できない本文は ID なしの成功として扱う。
fn created_row_id(body: &str) -> Option<RowId> {
    if body.trim().is_empty() {
        return None;
    }
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                target: "remote::postgrest",
                error = %err,
                "create response is not JSON; created row id unknown"
            );
            return None;
        }
    };

    let row = match &value {
        Value::Array(rows) => rows.first(),
        Value::Object(_) => Some(&value),
        _ => None,
    };
    row.and_then(|row| row.get(ROW_ID_FIELD))
        .and_then(RowId::from_value)
}
