use anyhow::{anyhow, Result};
use chrono::Local;
use std::fs::File;
use std::path::Path;

use crate::columns::{ColumnSet, Record};

/// Handles exporting a finished report run to files
pub struct ReportExporter;

impl ReportExporter {
    /// Export records to a timestamped CSV file in the current directory,
    /// columns in column-set order.
    pub fn export_to_csv(records: &[Record], columns: &ColumnSet) -> Result<String> {
        if records.is_empty() {
            return Err(anyhow!("No records to export - build a report first"));
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("report_{}.csv", timestamp);
        Self::write_csv(records, columns, Path::new(&filename))?;

        Ok(format!("Exported {} rows to {}", records.len(), filename))
    }

    /// Export records to a timestamped pretty-printed JSON file.
    pub fn export_to_json(records: &[Record]) -> Result<String> {
        if records.is_empty() {
            return Err(anyhow!("No records to export - build a report first"));
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("report_{}.json", timestamp);
        Self::write_json(records, Path::new(&filename))?;

        Ok(format!("Exported {} rows to {}", records.len(), filename))
    }

    pub fn write_csv(records: &[Record], columns: &ColumnSet, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        let headers = columns.column_names();
        wtr.write_record(&headers)?;

        for record in records {
            let row: Vec<&str> = headers
                .iter()
                .map(|header| record.get(header).map(String::as_str).unwrap_or(""))
                .collect();
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_json(records: &[Record], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, records)?;
        Ok(())
    }
}
