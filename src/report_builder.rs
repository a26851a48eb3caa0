use chrono::NaiveDate;

use crate::api_client::{
    build_dimension_spec, build_metric_spec, Dimension, Metric, QuerySpec, SamplingLevel,
};
use crate::columns::{ColumnSet, Record};
use crate::error::{ReportError, Result};
use crate::report_source::ReportSource;

pub const DEFAULT_PAGE_SIZE: u32 = 10_000;
pub const MAX_SAMPLE_SIZE: u32 = 500;

/// Where a report run currently stands. Transitions are linear: dimensions,
/// then metrics, then column discovery, then pagination. `Paginating` only
/// exists while `build_report` is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Unconfigured,
    DimensionsSet,
    MetricsSet,
    ColumnsDiscovered,
    Paginating,
    Complete,
}

/// Orchestrates one report run against a `ReportSource`: column discovery
/// via a one-row probe, full-result pagination following continuation
/// tokens, and flattening of every page's rows into a single flat record
/// sequence.
pub struct ReportBuilder<S: ReportSource> {
    source: S,
    start_date: NaiveDate,
    end_date: NaiveDate,
    sampling_level: SamplingLevel,
    page_size: u32,
    dimensions: Vec<Dimension>,
    metrics: Vec<Metric>,
    columns: Option<ColumnSet>,
    records: Vec<Record>,
    state: BuilderState,
}

impl<S: ReportSource> ReportBuilder<S> {
    pub fn new(source: S, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            source,
            start_date,
            end_date,
            sampling_level: SamplingLevel::default(),
            page_size: DEFAULT_PAGE_SIZE,
            dimensions: Vec::new(),
            metrics: Vec::new(),
            columns: None,
            records: Vec::new(),
            state: BuilderState::Unconfigured,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sampling_level(mut self, sampling_level: SamplingLevel) -> Self {
        self.sampling_level = sampling_level;
        self
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn columns(&self) -> Option<&ColumnSet> {
        self.columns.as_ref()
    }

    /// Records accumulated by the last completed `build_report` run.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Validate and store the dimension list. Re-setting after discovery
    /// drops the discovered columns and any accumulated result.
    pub fn set_dimensions<N: AsRef<str>>(&mut self, names: &[N]) -> Result<()> {
        self.dimensions = build_dimension_spec(names)?;
        self.columns = None;
        self.records.clear();
        self.state = if self.metrics.is_empty() {
            BuilderState::DimensionsSet
        } else {
            BuilderState::MetricsSet
        };
        Ok(())
    }

    /// Validate and store the metric list. Dimensions must already be set.
    pub fn set_metrics<N: AsRef<str>>(&mut self, names: &[N]) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(ReportError::Precondition(
                "dimensions must be set before metrics".to_string(),
            ));
        }
        self.metrics = build_metric_spec(names)?;
        self.columns = None;
        self.records.clear();
        self.state = BuilderState::MetricsSet;
        Ok(())
    }

    /// Probe the API with a one-row fetch and build the column set from the
    /// response header. Idempotent for an unchanged configuration; calling
    /// it again re-probes.
    pub fn discover_columns(&mut self) -> Result<&ColumnSet> {
        if !matches!(
            self.state,
            BuilderState::MetricsSet | BuilderState::ColumnsDiscovered | BuilderState::Complete
        ) {
            return Err(ReportError::Precondition(
                "dimensions and metrics must be set before discovering columns".to_string(),
            ));
        }

        let report = self.source.fetch_page(&self.query_spec(), 1, None)?;
        let columns = ColumnSet::from_header(&report.column_header);
        if self.state == BuilderState::MetricsSet {
            self.state = BuilderState::ColumnsDiscovered;
        }
        Ok(self.columns.insert(columns))
    }

    /// Fetch one page of up to `sample_size` rows and flatten it, without
    /// pagination and without touching the stored run result.
    pub fn sample(&self, sample_size: u32) -> Result<Vec<Record>> {
        if sample_size == 0 || sample_size > MAX_SAMPLE_SIZE {
            return Err(ReportError::InvalidArgument(format!(
                "sample size must be between 1 and {}, got {}",
                MAX_SAMPLE_SIZE, sample_size
            )));
        }
        let columns = self.columns.as_ref().ok_or_else(|| {
            ReportError::Precondition(
                "columns must be discovered before sampling".to_string(),
            )
        })?;

        let report = self
            .source
            .fetch_page(&self.query_spec(), sample_size, None)?;
        Ok(columns.flatten(&report.data))
    }

    /// Run the full report: fetch the first page at the configured page
    /// size, then follow continuation tokens until a page carries none,
    /// flattening and concatenating every page's rows in order. On any
    /// fetch failure the partial accumulation is discarded and the
    /// discovered columns remain valid for a from-scratch retry.
    pub fn build_report(&mut self) -> Result<&[Record]> {
        if !matches!(
            self.state,
            BuilderState::ColumnsDiscovered | BuilderState::Complete
        ) {
            return Err(ReportError::Precondition(
                "columns must be discovered before building a report".to_string(),
            ));
        }
        let Some(columns) = self.columns.clone() else {
            return Err(ReportError::Precondition(
                "columns must be discovered before building a report".to_string(),
            ));
        };

        self.state = BuilderState::Paginating;
        match self.paginate(&columns) {
            Ok(records) => {
                self.records = records;
                self.state = BuilderState::Complete;
                Ok(&self.records)
            }
            Err(e) => {
                self.state = BuilderState::ColumnsDiscovered;
                Err(e)
            }
        }
    }

    fn paginate(&self, columns: &ColumnSet) -> Result<Vec<Record>> {
        let query = self.query_spec();
        let mut records = Vec::new();
        let mut page_number = 1u32;

        let mut report = self.source.fetch_page(&query, self.page_size, None)?;
        loop {
            tracing::info!(
                target: "report",
                "page {} fetched ({} rows)",
                page_number,
                report.data.rows.len()
            );
            records.extend(columns.flatten(&report.data));

            let Some(token) = report.next_page_token.take() else {
                break;
            };
            page_number += 1;
            tracing::info!(
                target: "report",
                "following continuation token {} for page {}",
                token,
                page_number
            );
            report = self.source.fetch_page(&query, self.page_size, Some(&token))?;
        }

        Ok(records)
    }

    fn query_spec(&self) -> QuerySpec {
        QuerySpec {
            start_date: self.start_date,
            end_date: self.end_date,
            metrics: self.metrics.clone(),
            dimensions: self.dimensions.clone(),
            sampling_level: self.sampling_level,
        }
    }
}
