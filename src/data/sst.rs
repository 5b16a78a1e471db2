//! SST point-query API integration.
//!
//! One request per (coordinate, date, metric). Every failure is reported as a
//! `FetchError` so the caller can log it and move on; nothing here is fatal.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Coordinate, MetricKind, SampleDate};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.deepearth.digital";
pub const POINT_ENDPOINT: &str = "/api/sst/point";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "X-API-Key";

// Fixed query parameters the service expects alongside the point.
const DATA_SOURCE: &str = "timeseries-graph";
const ZOOM_LEVEL: &str = "5";
const MAX_POINTS: &str = "4000";
const RADIUS: &str = "2.0";

/// Connection settings for the point API.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), POINT_ENDPOINT)
    }
}

// The key is a secret; keep it out of debug output.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Why a single point query produced no value.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {0}: API key rejected")]
    Unauthorized(StatusCode),

    #[error("HTTP {0}: rate limited")]
    RateLimited(StatusCode),

    #[error("HTTP {0}")]
    HttpStatus(StatusCode),

    #[error("API returned non-success status: {0}")]
    ApiStatus(String),

    #[error("response contains no {0} value")]
    MissingValue(MetricKind),

    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    /// 401/403: the key was refused.
    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Unauthorized(_))
    }
}

/// Anything that can answer a point query.
///
/// `SstClient` is the HTTP implementation; the collection loop only sees this trait.
pub trait PointSource {
    fn fetch_point(
        &self,
        coord: &Coordinate,
        date: SampleDate,
        metric: MetricKind,
    ) -> Result<f64, FetchError>;
}

pub struct SstClient {
    client: Client,
    config: ApiConfig,
    url: String,
}

impl SstClient {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        let url = config.endpoint_url();
        Ok(Self {
            client,
            config,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            FetchError::Network(err)
        }
    }
}

impl PointSource for SstClient {
    fn fetch_point(
        &self,
        coord: &Coordinate,
        date: SampleDate,
        metric: MetricKind,
    ) -> Result<f64, FetchError> {
        tracing::debug!(url = %self.url, %date, %metric, "point query");

        let resp = self
            .client
            .get(&self.url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .query(&point_query(coord, date, metric))
            .send()
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| self.classify(e))?;

        interpret_response(status, &body, metric)
    }
}

/// Query parameters for one point request.
pub fn point_query(
    coord: &Coordinate,
    date: SampleDate,
    metric: MetricKind,
) -> Vec<(&'static str, String)> {
    vec![
        ("lat", coord.lat().to_string()),
        ("lon", coord.lon().to_string()),
        ("data_type", metric.as_query_str().to_string()),
        ("date", date.to_string()),
        ("data_source", DATA_SOURCE.to_string()),
        ("zoom_level", ZOOM_LEVEL.to_string()),
        ("max_points", MAX_POINTS.to_string()),
        ("radius", RADIUS.to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    status: Option<String>,
    #[serde(default)]
    data: Option<PointData>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PointData {
    temperature: Option<f64>,
    anomaly: Option<f64>,
}

/// Turn an HTTP status and body into a value or a `FetchError`.
///
/// Only a 200 with `"status": "success"` and a finite value for `metric` counts.
pub fn interpret_response(
    status: StatusCode,
    body: &str,
    metric: MetricKind,
) -> Result<f64, FetchError> {
    match status {
        StatusCode::OK => {}
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(FetchError::Unauthorized(status));
        }
        StatusCode::TOO_MANY_REQUESTS => return Err(FetchError::RateLimited(status)),
        other => return Err(FetchError::HttpStatus(other)),
    }

    let parsed: PointResponse = serde_json::from_str(body).map_err(FetchError::Decode)?;

    if parsed.status.as_deref() != Some("success") {
        let detail = match parsed.detail {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "Unknown error".to_string(),
        };
        return Err(FetchError::ApiStatus(detail));
    }

    let value = parsed.data.and_then(|d| match metric {
        MetricKind::Mean => d.temperature,
        MetricKind::Anomaly => d.anomaly,
    });

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(FetchError::MissingValue(metric)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    const SUCCESS_BODY: &str = r#"{
        "status": "success",
        "data": {"temperature": 21.37, "anomaly": -0.42, "lat": 38.125, "lon": 4.125},
        "attribution": {"source": "NOAA OISST v2.1"}
    }"#;

    #[test]
    fn success_body_selects_field_by_metric() {
        let t = interpret_response(StatusCode::OK, SUCCESS_BODY, MetricKind::Mean).unwrap();
        let a = interpret_response(StatusCode::OK, SUCCESS_BODY, MetricKind::Anomaly).unwrap();
        assert_eq!(t, 21.37);
        assert_eq!(a, -0.42);
    }

    #[test]
    fn auth_statuses_are_distinguishable() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = interpret_response(status, "", MetricKind::Mean).unwrap_err();
            assert!(err.is_auth(), "{status} should be an auth failure");
        }
        let err = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "", MetricKind::Mean)
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_auth());
    }

    #[test]
    fn rate_limit_is_reported() {
        let err = interpret_response(StatusCode::TOO_MANY_REQUESTS, "", MetricKind::Anomaly)
            .unwrap_err();
        assert!(matches!(err, FetchError::RateLimited(_)));
    }

    #[test]
    fn non_success_status_carries_detail() {
        let body = r#"{"status": "error", "detail": "date out of range"}"#;
        let err = interpret_response(StatusCode::OK, body, MetricKind::Mean).unwrap_err();
        match err {
            FetchError::ApiStatus(detail) => assert_eq!(detail, "date out of range"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = interpret_response(StatusCode::OK, r#"{"status": "error"}"#, MetricKind::Mean)
            .unwrap_err();
        assert!(matches!(err, FetchError::ApiStatus(ref d) if d == "Unknown error"));
    }

    #[test]
    fn null_or_absent_value_is_missing_not_zero() {
        let body = r#"{"status": "success", "data": {"temperature": null, "anomaly": 0.1}}"#;
        let err = interpret_response(StatusCode::OK, body, MetricKind::Mean).unwrap_err();
        assert!(matches!(err, FetchError::MissingValue(MetricKind::Mean)));

        let body = r#"{"status": "success"}"#;
        let err = interpret_response(StatusCode::OK, body, MetricKind::Anomaly).unwrap_err();
        assert!(matches!(err, FetchError::MissingValue(MetricKind::Anomaly)));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = interpret_response(StatusCode::OK, "<html>oops</html>", MetricKind::Mean)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        let body = r#"{"status": "success", "data": {"temperature": "warm"}}"#;
        let err = interpret_response(StatusCode::OK, body, MetricKind::Mean).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    fn param<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn query_encodes_point_date_and_metric() {
        let coord = Coordinate::new(38.13, 4.13).unwrap();
        let date = SampleDate::new(2020, 6).unwrap();
        let q = point_query(&coord, date, MetricKind::Anomaly);
        assert_eq!(param(&q, "lat"), Some("38.13"));
        assert_eq!(param(&q, "lon"), Some("4.13"));
        assert_eq!(param(&q, "date"), Some("2020-06-01"));
        assert_eq!(param(&q, "data_type"), Some("anomaly"));
        assert_eq!(param(&q, "data_source"), Some("timeseries-graph"));
    }

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let cfg = ApiConfig::new("http://localhost:8080/", "k");
        assert_eq!(cfg.endpoint_url(), "http://localhost:8080/api/sst/point");
        assert!(!format!("{cfg:?}").contains("\"k\""));

        let client = SstClient::new(cfg).unwrap();
        assert_eq!(client.url(), "http://localhost:8080/api/sst/point");
    }

    /// Serve exactly one canned HTTP response and hand back the raw request.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn client_sends_key_and_query_and_reads_value() {
        let (base, server) = serve_once("200 OK", SUCCESS_BODY);
        let client = SstClient::new(ApiConfig::new(base, "secret-key")).unwrap();
        let coord = Coordinate::new(38.13, 4.13).unwrap();
        let date = SampleDate::new(2020, 6).unwrap();

        let value = client.fetch_point(&coord, date, MetricKind::Mean).unwrap();
        assert_eq!(value, 21.37);

        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /api/sst/point?"));
        assert!(request.contains("data_type=mean"));
        assert!(request.contains("date=2020-06-01"));
        assert!(request.contains("x-api-key: secret-key"));
    }

    #[test]
    fn client_reports_rejected_key() {
        let (base, server) = serve_once("403 Forbidden", r#"{"detail": "invalid key"}"#);
        let client = SstClient::new(ApiConfig::new(base, "bad")).unwrap();
        let coord = Coordinate::new(0.0, 0.0).unwrap();
        let date = SampleDate::new(2020, 1).unwrap();

        let err = client.fetch_point(&coord, date, MetricKind::Anomaly).unwrap_err();
        assert!(err.is_auth());
        server.join().unwrap();
    }

    #[test]
    fn client_reports_connection_failure_as_network_error() {
        // Bind then drop so the port is very likely closed.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let mut cfg = ApiConfig::new(format!("http://{addr}"), "k");
        cfg.timeout = Duration::from_secs(2);
        let client = SstClient::new(cfg).unwrap();
        let coord = Coordinate::new(0.0, 0.0).unwrap();
        let date = SampleDate::new(2020, 1).unwrap();

        let err = client.fetch_point(&coord, date, MetricKind::Mean).unwrap_err();
        assert!(matches!(err, FetchError::Network(_) | FetchError::Timeout(_)));
    }
}
