use crate::models::{ChartRequest, PlayCounts, WeeklyChartResponse};
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use std::{cmp::Reverse, fmt::Display, future::Future};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanFailure {
    pub index: usize,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub message: String,
}

/// Weekly charts in ascending `to_date` order, plus the spans that failed.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    pub charts: Vec<WeeklyChartResponse>,
    pub failures: Vec<SpanFailure>,
    pub first_from: Option<DateTime<Utc>>,
}

impl AggregatedResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure of the earliest dispatched request.
    pub fn first_error(&self) -> Option<&SpanFailure> {
        self.failures.first()
    }

    pub fn totals(&self) -> PlayCounts {
        let mut totals = PlayCounts::new();
        for chart in &self.charts {
            for (name, count) in &chart.chart {
                let total = totals.entry(name.clone()).or_default();
                *total = total.saturating_add(*count);
            }
        }
        totals
    }

    /// Plays of `name` over the weeks ending within `window` before `to_date`,
    /// never reaching back past the first fetched span.
    pub fn rolling_total(&self, to_date: DateTime<Utc>, name: &str, window: Duration) -> u64 {
        let floor = self.first_from.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let start = to_date
            .checked_sub_signed(window)
            .map_or(floor, |start| start.max(floor));
        self.charts
            .iter()
            .filter(|chart| start <= chart.to_date && chart.to_date <= to_date)
            .filter_map(|chart| chart.chart.get(name))
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }
}

/// The `limit` most played entries, ties broken by name.
pub fn top_positions(counts: &PlayCounts, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    entries.sort_by_key(|(name, count)| (Reverse(*count), name.clone()));
    entries.truncate(limit);
    entries
}

/// Runs one fetch per request concurrently and waits for all of them.
pub async fn fetch_all<F, Fut, E>(requests: Vec<ChartRequest>, fetch: F) -> AggregatedResult
where
    F: Fn(ChartRequest) -> Fut,
    Fut: Future<Output = Result<WeeklyChartResponse, E>>,
    E: Display,
{
    let first_from = requests.iter().map(|request| request.from_date).min();
    let windows: Vec<_> = requests
        .iter()
        .map(|request| (request.from_date, request.to_date))
        .collect();

    let settled = join_all(requests.into_iter().map(&fetch)).await;

    let mut charts = Vec::with_capacity(settled.len());
    let mut failures = Vec::new();
    for (index, (outcome, (from_date, to_date))) in settled.into_iter().zip(windows).enumerate() {
        match outcome {
            Ok(chart) => charts.push(chart),
            Err(err) => {
                warn!(index, %from_date, %to_date, "weekly chart failed: {err}");
                failures.push(SpanFailure {
                    index,
                    from_date,
                    to_date,
                    message: err.to_string(),
                });
            }
        }
    }
    charts.sort_by_key(|chart| chart.to_date);

    AggregatedResult {
        charts,
        failures,
        first_from,
    }
}
