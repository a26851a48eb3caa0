use std::collections::HashMap;

use crate::api_client::{ColumnHeader, ReportData, ReportRow};

/// One flattened output row keyed by column name. Never mutated after
/// creation.
pub type Record = HashMap<String, String>;

/// The discovered ordered column names for a query shape. Position in a raw
/// row's dimension/metric value arrays corresponds by index to position in
/// these sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    dimension_columns: Vec<String>,
    metric_columns: Vec<String>,
}

impl ColumnSet {
    /// Build the column set from a response header: dimension columns come
    /// straight from the header's dimension list, metric columns from the
    /// metric header entry names, both orders preserved.
    pub fn from_header(header: &ColumnHeader) -> Self {
        Self {
            dimension_columns: header.dimensions.clone(),
            metric_columns: header
                .metric_header
                .metric_header_entries
                .iter()
                .map(|entry| entry.name.clone())
                .collect(),
        }
    }

    pub fn dimension_columns(&self) -> &[String] {
        &self.dimension_columns
    }

    pub fn metric_columns(&self) -> &[String] {
        &self.metric_columns
    }

    /// All column names, dimensions first.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.dimension_columns.clone();
        names.extend(self.metric_columns.iter().cloned());
        names
    }

    /// Flatten a page's rows into records, preserving row order.
    pub fn flatten(&self, data: &ReportData) -> Vec<Record> {
        data.rows.iter().map(|row| self.flatten_row(row)).collect()
    }

    /// Zip column names against a raw row's values positionally. A length
    /// mismatch truncates to the shorter side; the row still materializes
    /// but the mismatch is logged. If a dimension and metric share a name,
    /// the metric value wins.
    fn flatten_row(&self, row: &ReportRow) -> Record {
        if row.dimensions.len() != self.dimension_columns.len() {
            tracing::warn!(
                target: "report",
                "row has {} dimension values for {} dimension columns, truncating to shorter",
                row.dimensions.len(),
                self.dimension_columns.len()
            );
        }

        let mut record = Record::new();
        for (name, value) in self.dimension_columns.iter().zip(&row.dimensions) {
            record.insert(name.clone(), value.clone());
        }

        let metric_values = row
            .metrics
            .first()
            .map(|group| group.values.as_slice())
            .unwrap_or(&[]);
        if metric_values.len() != self.metric_columns.len() {
            tracing::warn!(
                target: "report",
                "row has {} metric values for {} metric columns, truncating to shorter",
                metric_values.len(),
                self.metric_columns.len()
            );
        }
        for (name, value) in self.metric_columns.iter().zip(metric_values) {
            record.insert(name.clone(), value.clone());
        }

        record
    }
}
