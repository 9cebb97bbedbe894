use std::time::Duration;

use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    domain::{DocsPage, Space, SpacesResponse, Task, TaskQuery, TasksPage},
    ClickUpUrl,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for the ClickUp REST API, scoped to one workspace (team).
#[derive(Debug, Clone)]
pub struct ClickUpClient {
    http: reqwest::Client,
    base_url: ClickUpUrl,
    token: String,
    team_id: String,
}

impl ClickUpClient {
    pub fn new(
        token: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Result<Self, ClickUpFetchError> {
        Self::with_base_url(ClickUpUrl::from_env(), token, team_id)
    }

    pub fn with_base_url(
        base_url: ClickUpUrl,
        token: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Result<Self, ClickUpFetchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClickUpFetchError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
            team_id: team_id.into(),
        })
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: impl AsRef<str>,
    ) -> Result<T, ClickUpFetchError> {
        let url = url.as_ref();
        debug!(url, "GET");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, &self.token)
            .send()
            .await
            .map_err(|e| ClickUpFetchError::ResponseError(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ClickUpFetchError::Unauthorized)
            }
            StatusCode::NOT_FOUND => return Err(ClickUpFetchError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => return Err(ClickUpFetchError::RateLimited),
            status if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(ClickUpFetchError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        resp.json::<T>().await.map_err(|e| {
            ClickUpFetchError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// One page of the filtered team tasks endpoint. Pages are zero based.
    #[instrument(skip(self, query))]
    pub async fn fetch_tasks_page(
        &self,
        query: &TaskQuery,
        page: u32,
    ) -> Result<TasksPage, ClickUpFetchError> {
        let url = self
            .base_url
            .append_path(&format!("/v2/team/{}/task", self.team_id))
            .with_query("page", page.to_string())
            .with_query("subtasks", "true")
            .with_query("order_by", "updated");
        let url = query.apply(url);

        self.fetch(url).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_task(&self, task_id: &str) -> Result<Task, ClickUpFetchError> {
        let url = self
            .base_url
            .append_path(&format!("/v2/task/{}", task_id))
            .with_query("include_markdown_description", "true");

        self.fetch(url).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_docs_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<DocsPage, ClickUpFetchError> {
        let mut url = self
            .base_url
            .append_path(&format!("/v3/workspaces/{}/docs", self.team_id))
            .with_query("deleted", "false");
        if let Some(cursor) = cursor {
            url = url.with_query("cursor", cursor);
        }

        self.fetch(url).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_spaces(&self, archived: bool) -> Result<Vec<Space>, ClickUpFetchError> {
        let url = self
            .base_url
            .append_path(&format!("/v2/team/{}/space", self.team_id))
            .with_query("archived", archived.to_string());

        let response: SpacesResponse = self.fetch(url).await?;
        Ok(response.spaces)
    }
}

#[derive(Error, Debug)]
pub enum ClickUpFetchError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    #[error("Rate limited")]
    RateLimited,
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("Other: {0}")]
    Other(String),
}
