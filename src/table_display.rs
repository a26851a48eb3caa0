use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use ga_report::columns::{ColumnSet, Record};

pub fn display_records(records: &[Record], columns: &ColumnSet, max_rows: usize) {
    if records.is_empty() {
        println!("{}", "No rows returned.".yellow());
        return;
    }

    let headers = columns.column_names();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for record in records.iter().take(max_rows) {
        let row: Vec<String> = headers
            .iter()
            .map(|name| record.get(name).cloned().unwrap_or_default())
            .collect();
        table.add_row(row);
    }

    println!("{table}");
    if records.len() > max_rows {
        println!(
            "{}",
            format!("... showing first {} of {} rows", max_rows, records.len()).yellow()
        );
    }
    println!("\n{}", format!("{} rows returned", records.len()).green());
}
