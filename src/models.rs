use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Entity name to play count for one time window.
pub type PlayCounts = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Artist,
    Album,
    Track,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Artist, ChartType::Album, ChartType::Track];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Artist => "artist",
            ChartType::Album => "album",
            ChartType::Track => "track",
        }
    }

    pub fn upstream_method(self) -> &'static str {
        match self {
            ChartType::Artist => "user.getweeklyartistchart",
            ChartType::Album => "user.getweeklyalbumchart",
            ChartType::Track => "user.getweeklytrackchart",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.to_lowercase();
        ChartType::ALL
            .into_iter()
            .find(|chart_type| chart_type.as_str() == lowered)
            .ok_or_else(|| {
                AppError::bad_request(format!(
                    "Unrecognized chart type '{value}': parameter 'chart_type' must be one of artist, album, track"
                ))
            })
    }
}

/// Raw query of `GET /get_weekly_chart`, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct WeeklyChartParams {
    pub username: Option<String>,
    pub chart_type: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserInfoParams {
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub username: String,
    pub chart_type: ChartType,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

impl ChartRequest {
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &self.username)
            .append_pair("chart_type", self.chart_type.as_str())
            .append_pair("from_date", &self.from_date.timestamp().to_string())
            .append_pair("to_date", &self.to_date.timestamp().to_string())
            .finish()
    }
}

impl TryFrom<WeeklyChartParams> for ChartRequest {
    type Error = AppError;

    fn try_from(params: WeeklyChartParams) -> Result<Self, Self::Error> {
        let username = required(params.username, "username")?.to_lowercase();
        let chart_type = required(params.chart_type, "chart_type")?;
        let raw_from = required(params.from_date, "from_date")?;
        let raw_to = required(params.to_date, "to_date")?;

        let chart_type = chart_type.parse::<ChartType>()?;
        match (parse_unix(&raw_from), parse_unix(&raw_to)) {
            (Some(from_date), Some(to_date)) => Ok(ChartRequest {
                username,
                chart_type,
                from_date,
                to_date,
            }),
            _ => Err(AppError::bad_request("Date must be presented in Unix format")),
        }
    }
}

pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::missing_parameter(name))
}

fn parse_unix(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyChartResponse {
    #[serde(rename = "Chart")]
    pub chart: PlayCounts,
    #[serde(rename = "ToDate", with = "chrono::serde::ts_seconds")]
    pub to_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    fn params(username: &str, chart_type: &str, from: &str, to: &str) -> WeeklyChartParams {
        let wrap = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());
        WeeklyChartParams {
            username: wrap(username),
            chart_type: wrap(chart_type),
            from_date: wrap(from),
            to_date: wrap(to),
        }
    }

    #[test]
    fn missing_parameters_are_reported_in_order() {
        let err = ChartRequest::try_from(params("", "", "", "")).unwrap_err();
        assert_eq!(err.message, "Parameter 'username' is missing");

        let err = ChartRequest::try_from(params("rj", "", "", "")).unwrap_err();
        assert_eq!(err.message, "Parameter 'chart_type' is missing");

        let err = ChartRequest::try_from(params("rj", "artist", "", "5")).unwrap_err();
        assert_eq!(err.message, "Parameter 'from_date' is missing");

        let err = ChartRequest::try_from(params("rj", "artist", "5", "")).unwrap_err();
        assert_eq!(err.message, "Parameter 'to_date' is missing");
    }

    #[test]
    fn invalid_chart_type_names_the_parameter() {
        let err = ChartRequest::try_from(params("rj", "invalid", "1", "2")).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("chart_type"));
    }

    #[test]
    fn malformed_from_date_fails_regardless_of_to_date() {
        for to in ["1700000000", "xyz"] {
            let err = ChartRequest::try_from(params("rj", "track", "abc", to)).unwrap_err();
            assert_eq!(err.message, "Date must be presented in Unix format");
        }
    }

    #[test]
    fn username_and_chart_type_are_case_folded() {
        let request = ChartRequest::try_from(params("RJ", "Album", "100", "200")).unwrap();
        assert_eq!(request.username, "rj");
        assert_eq!(request.chart_type, ChartType::Album);
        assert_eq!(request.from_date.timestamp(), 100);
        assert_eq!(request.to_date.timestamp(), 200);
    }

    #[test]
    fn query_string_decodes_back_to_the_same_request() {
        let original = ChartRequest {
            username: "some user&co".to_string(),
            chart_type: ChartType::Track,
            from_date: DateTime::from_timestamp(1_420_372_800, 0).unwrap(),
            to_date: DateTime::from_timestamp(1_420_977_600, 0).unwrap(),
        };

        let uri: Uri = format!("/get_weekly_chart?{}", original.to_query_string())
            .parse()
            .unwrap();
        let Query(decoded) = Query::<WeeklyChartParams>::try_from_uri(&uri).unwrap();
        let decoded = ChartRequest::try_from(decoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn weekly_chart_response_uses_wire_field_names() {
        let response = WeeklyChartResponse {
            chart: PlayCounts::from([("Low".to_string(), 12)]),
            to_date: DateTime::from_timestamp(1_420_977_600, 0).unwrap(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "Chart": { "Low": 12 }, "ToDate": 1_420_977_600 })
        );
    }
}
