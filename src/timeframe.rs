use crate::errors::AppError;
use crate::models::{ChartRequest, ChartType};
use crate::spans::weekly_spans;
use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    LastSevenDays,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    LastTwelveMonths,
    Overall,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::LastSevenDays,
        Timeframe::LastMonth,
        Timeframe::LastThreeMonths,
        Timeframe::LastSixMonths,
        Timeframe::LastTwelveMonths,
        Timeframe::Overall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::LastSevenDays => "last-7-days",
            Timeframe::LastMonth => "last-month",
            Timeframe::LastThreeMonths => "last-3-months",
            Timeframe::LastSixMonths => "last-6-months",
            Timeframe::LastTwelveMonths => "last-12-months",
            Timeframe::Overall => "overall",
        }
    }

    // Relative windows reach back twice their length.
    pub fn from_date(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let back = match self {
            Timeframe::LastSevenDays => return now - Duration::weeks(2),
            Timeframe::LastMonth => 2,
            Timeframe::LastThreeMonths => 6,
            Timeframe::LastSixMonths => 12,
            Timeframe::LastTwelveMonths => 24,
            Timeframe::Overall => return overall_epoch(),
        };
        now.checked_sub_months(Months::new(back))
            .unwrap_or_else(overall_epoch)
    }

    pub fn rolling_window(self, first: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        match self {
            Timeframe::Overall => now - first,
            _ => (now - first) / 2,
        }
    }
}

impl FromStr for Timeframe {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str() == value)
            .ok_or_else(|| AppError::bad_request(format!("Unrecognized timeframe: {value}")))
    }
}

/// Earliest date the upstream service has charts for.
pub fn overall_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn plan_requests(
    username: &str,
    chart_type: &str,
    timeframe: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ChartRequest>, AppError> {
    if username.is_empty() {
        return Err(AppError::missing_parameter("username"));
    }
    let chart_type = chart_type.parse::<ChartType>()?;
    let timeframe = timeframe.parse::<Timeframe>()?;
    let username = username.to_lowercase();

    let requests = weekly_spans(timeframe.from_date(now), now)
        .into_iter()
        .map(|span| ChartRequest {
            username: username.clone(),
            chart_type,
            from_date: span.start(),
            to_date: span.end(),
        })
        .collect();
    Ok(requests)
}
