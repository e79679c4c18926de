use crate::aggregator::{fetch_all, AggregatedResult};
use crate::errors::AppError;
use crate::models::{ChartRequest, ErrorResponse, WeeklyChartResponse};
use crate::timeframe::plan_requests;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Invalid(#[from] AppError),
}

#[derive(Clone)]
pub struct ChartsClient {
    http: Client,
    base_url: String,
}

impl ChartsClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub async fn weekly_chart(&self, request: &ChartRequest) -> Result<WeeklyChartResponse, ClientError> {
        let url = format!("{}/get_weekly_chart?{}", self.base_url, request.to_query_string());
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    pub async fn user_info(&self, username: &str) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .get(format!("{}/get_info", self.base_url))
            .query(&[("username", username)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn fetch_timeframe(
        &self,
        username: &str,
        chart_type: &str,
        timeframe: &str,
        now: DateTime<Utc>,
    ) -> Result<AggregatedResult, ClientError> {
        let requests = plan_requests(username, chart_type, timeframe, now)?;
        let result = fetch_all(requests, |request| async move {
            self.weekly_chart(&request).await
        })
        .await;
        Ok(result)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(err) => format!("failed to parse error response: {err}"),
        };
        return Err(ClientError::Server { status, message });
    }
    Ok(response.json().await?)
}
