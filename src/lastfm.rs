use crate::models::{ChartRequest, ChartType, PlayCounts};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream answered with status {0}")]
    Status(StatusCode),
    #[error("upstream error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected a {expected} chart but got a {actual} chart")]
    ChartMismatch {
        expected: ChartType,
        actual: ChartType,
    },
}

#[derive(Clone)]
pub struct LastFmClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl LastFmClient {
    pub fn new(http: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn weekly_chart(&self, request: &ChartRequest) -> Result<PlayCounts, UpstreamError> {
        let from = request.from_date.timestamp().to_string();
        let to = request.to_date.timestamp().to_string();
        let body = self
            .call(
                request.chart_type.upstream_method(),
                &[
                    ("user", request.username.as_str()),
                    ("from", from.as_str()),
                    ("to", to.as_str()),
                ],
            )
            .await?;
        decode_weekly_chart(&body, request.chart_type)
    }

    pub async fn user_info(&self, username: &str) -> Result<serde_json::Value, UpstreamError> {
        let body = self.call("user.getinfo", &[("user", username)]).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<Vec<u8>, UpstreamError> {
        debug!(method, "calling upstream");
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("method", method),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        // Failures arrive as an error envelope, sometimes with a 200 status.
        if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(&body) {
            return Err(UpstreamError::Api {
                code: envelope.error,
                message: envelope.message,
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        Ok(body)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: i64,
    message: String,
}

#[derive(Deserialize)]
enum WeeklyChart {
    #[serde(rename = "weeklyartistchart")]
    Artist {
        #[serde(default)]
        artist: Entries,
    },
    #[serde(rename = "weeklyalbumchart")]
    Album {
        #[serde(default)]
        album: Entries,
    },
    #[serde(rename = "weeklytrackchart")]
    Track {
        #[serde(default)]
        track: Entries,
    },
}

impl WeeklyChart {
    fn chart_type(&self) -> ChartType {
        match self {
            WeeklyChart::Artist { .. } => ChartType::Artist,
            WeeklyChart::Album { .. } => ChartType::Album,
            WeeklyChart::Track { .. } => ChartType::Track,
        }
    }

    fn into_entries(self) -> Vec<ChartEntry> {
        let entries = match self {
            WeeklyChart::Artist { artist } => artist,
            WeeklyChart::Album { album } => album,
            WeeklyChart::Track { track } => track,
        };
        match entries {
            Entries::Many(entries) => entries,
            Entries::One(entry) => vec![entry],
        }
    }
}

/// Single-element lists are collapsed to a bare object upstream.
#[derive(Deserialize)]
#[serde(untagged)]
enum Entries {
    Many(Vec<ChartEntry>),
    One(ChartEntry),
}

impl Default for Entries {
    fn default() -> Self {
        Entries::Many(Vec::new())
    }
}

#[derive(Deserialize)]
struct ChartEntry {
    name: String,
    playcount: String,
}

pub fn decode_weekly_chart(body: &[u8], expected: ChartType) -> Result<PlayCounts, UpstreamError> {
    let chart: WeeklyChart = serde_json::from_slice(body)?;
    let actual = chart.chart_type();
    if actual != expected {
        return Err(UpstreamError::ChartMismatch { expected, actual });
    }

    let counts = chart
        .into_entries()
        .into_iter()
        .filter_map(|entry| {
            let count = entry.playcount.parse::<u64>().ok()?;
            Some((entry.name, count))
        })
        .collect();
    Ok(counts)
}
