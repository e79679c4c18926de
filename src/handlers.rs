use crate::errors::AppError;
use crate::models::{required, ChartRequest, UserInfoParams, WeeklyChartParams, WeeklyChartResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

const DATE_LAYOUT: &str = "%Y-%m-%d";

pub async fn get_weekly_chart(
    State(state): State<AppState>,
    query: Result<Query<WeeklyChartParams>, QueryRejection>,
) -> Result<Json<WeeklyChartResponse>, AppError> {
    let Query(params) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let request = ChartRequest::try_from(params)?;
    let upstream = state.upstream()?;

    let chart = upstream.weekly_chart(&request).await.map_err(|err| {
        warn!(
            username = %request.username,
            chart_type = %request.chart_type,
            "weekly chart failed: {err}"
        );
        AppError::conflict(format!(
            "Failed to get chart for week from {} to {}",
            day(request.from_date),
            day(request.to_date)
        ))
    })?;

    info!(
        username = %request.username,
        chart_type = %request.chart_type,
        entries = chart.len(),
        "weekly chart fetched"
    );
    Ok(Json(WeeklyChartResponse {
        chart,
        to_date: request.to_date,
    }))
}

pub async fn get_info(
    State(state): State<AppState>,
    query: Result<Query<UserInfoParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Query(params) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let username = required(params.username, "username")?.to_lowercase();
    let upstream = state.upstream()?;

    let info = upstream.user_info(&username).await.map_err(|err| {
        warn!(%username, "user info failed: {err}");
        AppError::conflict(format!("Failed to get user info: {err}"))
    })?;
    Ok(Json(info))
}

fn day(date: DateTime<Utc>) -> String {
    date.format(DATE_LAYOUT).to_string()
}
