use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::{ReportError, Result};
use crate::report_source::ReportSource;

pub const DEFAULT_ENDPOINT: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// One metric in a report request, wrapped the way the wire contract wants it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub expression: String,
}

/// One dimension in a report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SamplingLevel {
    Default,
    Small,
    #[default]
    Large,
}

/// The fixed part of a report run: date range, metrics, dimensions, sampling.
/// Page size and continuation token vary per fetch and are passed alongside.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    pub sampling_level: SamplingLevel,
}

/// Wrap metric names as `{expression: name}`, preserving order.
pub fn build_metric_spec<S: AsRef<str>>(names: &[S]) -> Result<Vec<Metric>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(ReportError::InvalidArgument(
                    "metric names must be non-empty strings".to_string(),
                ));
            }
            Ok(Metric {
                expression: name.to_string(),
            })
        })
        .collect()
}

/// Wrap dimension names as `{name: name}`, preserving order.
pub fn build_dimension_spec<S: AsRef<str>>(names: &[S]) -> Result<Vec<Dimension>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(ReportError::InvalidArgument(
                    "dimension names must be non-empty strings".to_string(),
                ));
            }
            Ok(Dimension {
                name: name.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetRequest {
    report_requests: Vec<ReportRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest {
    view_id: String,
    date_ranges: Vec<DateRange>,
    metrics: Vec<Metric>,
    dimensions: Vec<Dimension>,
    sampling_level: SamplingLevel,
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(default)]
    reports: Vec<Report>,
}

/// One report unit from the response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub column_header: ColumnHeader,
    #[serde(default)]
    pub data: ReportData,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metric_header: MetricHeader,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricHeader {
    #[serde(default)]
    pub metric_header_entries: Vec<MetricHeaderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricHeaderEntry {
    pub name: String,
}

/// The row payload of a page. `rows` is absent in empty result sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    pub row_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricValues>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricValues {
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Blocking client for the `reports:batchGet` endpoint. Holds the credential
/// handle and target view id; one page fetch per call, no retries.
#[derive(Clone)]
pub struct ReportClient {
    credential: Credential,
    view_id: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ReportClient {
    pub fn new(credential: Credential, view_id: impl Into<String>) -> Self {
        Self::with_endpoint(credential, view_id, DEFAULT_ENDPOINT)
    }

    /// Point the client at a different endpoint. Tests use this to target a
    /// local mock server.
    pub fn with_endpoint(
        credential: Credential,
        view_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            credential,
            view_id: view_id.into(),
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Fetch one page of results. `page_token` is omitted from the request
    /// body entirely when absent.
    pub fn fetch_page(
        &self,
        query: &QuerySpec,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Report> {
        let request = BatchGetRequest {
            report_requests: vec![ReportRequest {
                view_id: self.view_id.clone(),
                date_ranges: vec![DateRange {
                    start_date: query.start_date,
                    end_date: query.end_date,
                }],
                metrics: query.metrics.clone(),
                dimensions: query.dimensions.clone(),
                sampling_level: query.sampling_level,
                page_size,
                page_token: page_token.map(str::to_string),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.credential.bearer())
            .json(&request)
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ReportError::Authentication(Self::error_message(response)));
        }
        if !status.is_success() {
            return Err(ReportError::Api {
                status: status.as_u16(),
                message: Self::error_message(response),
            });
        }

        let envelope: BatchGetResponse = response.json()?;
        envelope
            .reports
            .into_iter()
            .next()
            .ok_or_else(|| ReportError::Api {
                status: status.as_u16(),
                message: "response contained no reports".to_string(),
            })
    }

    /// Pull the human-readable message out of the service error envelope,
    /// falling back to the raw body.
    fn error_message(response: reqwest::blocking::Response) -> String {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        match serde_json::from_str::<ApiErrorEnvelope>(&body) {
            Ok(envelope) => envelope.error.message,
            Err(_) if !body.is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

impl ReportSource for ReportClient {
    fn fetch_page(
        &self,
        query: &QuerySpec,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Report> {
        ReportClient::fetch_page(self, query, page_size, page_token)
    }
}
