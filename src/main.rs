use chrono::NaiveDate;
use crossterm::style::Stylize;
use std::env;

mod table_display;

use ga_report::api_client::{ReportClient, SamplingLevel};
use ga_report::config::Config;
use ga_report::credential::Credential;
use ga_report::export::ReportExporter;
use ga_report::logging::init_tracing;
use ga_report::report_builder::ReportBuilder;
use table_display::display_records;

fn print_help() {
    println!("{}", "ga-report - Google Analytics report fetcher".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  ga-report [OPTIONS] --start-date DATE --end-date DATE \\");
    println!("            --dimensions d1,d2 --metrics m1,m2");
    println!();
    println!("{}", "Options:".yellow());
    println!(
        "  {}   - Generate a default config file",
        "--init-config".green()
    );
    println!(
        "  {}     - View id to query (overrides config)",
        "--view-id ID".green()
    );
    println!(
        "  {}  - JSON key file with the access token",
        "--key-file PATH".green()
    );
    println!(
        "  {}      - Access token (overrides key file)",
        "--token TOK".green()
    );
    println!(
        "  {} - Report start date (YYYY-MM-DD)",
        "--start-date DATE".green()
    );
    println!(
        "  {}   - Report end date (YYYY-MM-DD)",
        "--end-date DATE".green()
    );
    println!(
        "  {} - Comma-separated dimension names",
        "--dimensions LIST".green()
    );
    println!(
        "  {}    - Comma-separated metric names",
        "--metrics LIST".green()
    );
    println!(
        "  {}       - Fetch a single sample page of N rows (max 500)",
        "--sample N".green()
    );
    println!(
        "  {}    - Rows per page during pagination",
        "--page-size N".green()
    );
    println!(
        "  {} - DEFAULT, SMALL or LARGE",
        "--sampling LEVEL".green()
    );
    println!(
        "  {} - Write results to a timestamped file",
        "--export csv|json".green()
    );
    println!();
    println!("{}", "Examples:".yellow());
    println!("  ga-report --view-id 12345 --key-file key.json \\");
    println!("            --start-date 2024-01-01 --end-date 2024-01-31 \\");
    println!("            --dimensions ga:country,ga:city --metrics ga:sessions");
    println!();
}

/// Value following `flag` in the args vector, if any.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_date(args: &[String], flag: &str) -> anyhow::Result<NaiveDate> {
    let raw = flag_value(args, flag)
        .ok_or_else(|| anyhow::anyhow!("{} is required (YYYY-MM-DD)", flag))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid {} '{}': {}", flag, raw, e))
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let config = Config::load()?;

    let view_id = flag_value(args, "--view-id")
        .map(str::to_string)
        .unwrap_or_else(|| config.api.view_id.clone());
    if view_id.is_empty() {
        anyhow::bail!("no view id: pass --view-id or set it in the config file");
    }

    let credential = if let Some(token) = flag_value(args, "--token") {
        Credential::from_token(token)
    } else if let Some(path) = flag_value(args, "--key-file") {
        Credential::from_key_file(path)?
    } else if let Some(path) = &config.api.key_file {
        Credential::from_key_file(path)?
    } else {
        anyhow::bail!("no credential: pass --token or --key-file, or set key_file in the config");
    };

    let start_date = parse_date(args, "--start-date")?;
    let end_date = parse_date(args, "--end-date")?;

    let dimensions = flag_value(args, "--dimensions")
        .map(split_names)
        .ok_or_else(|| anyhow::anyhow!("--dimensions is required (comma-separated names)"))?;
    let metrics = flag_value(args, "--metrics")
        .map(split_names)
        .ok_or_else(|| anyhow::anyhow!("--metrics is required (comma-separated names)"))?;

    let page_size = match flag_value(args, "--page-size") {
        Some(raw) => raw.parse()?,
        None => config.report.page_size,
    };
    let sampling_level = match flag_value(args, "--sampling") {
        Some(raw) => match raw.to_uppercase().as_str() {
            "DEFAULT" => SamplingLevel::Default,
            "SMALL" => SamplingLevel::Small,
            "LARGE" => SamplingLevel::Large,
            other => anyhow::bail!("unknown sampling level '{}'", other),
        },
        None => config.report.sampling_level,
    };

    let client = ReportClient::with_endpoint(credential, view_id, config.api.endpoint.clone());
    let mut builder = ReportBuilder::new(client, start_date, end_date)
        .with_page_size(page_size)
        .with_sampling_level(sampling_level);

    builder.set_dimensions(&dimensions)?;
    builder.set_metrics(&metrics)?;
    let columns = builder.discover_columns()?.clone();

    let records = match flag_value(args, "--sample") {
        Some(raw) => builder.sample(raw.parse()?)?,
        None => builder.build_report()?.to_vec(),
    };

    display_records(&records, &columns, config.report.max_display_rows);

    match flag_value(args, "--export") {
        Some("csv") => println!("{}", ReportExporter::export_to_csv(&records, &columns)?.green()),
        Some("json") => println!("{}", ReportExporter::export_to_json(&records)?.green()),
        Some(other) => anyhow::bail!("unknown export format '{}'", other),
        None => {}
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return;
    }

    if args.iter().any(|arg| arg == "--init-config" || arg == "--generate-config") {
        let config = Config::default();
        match config.save().and_then(|_| Config::get_config_path()) {
            Ok(path) => {
                println!("{}", format!("Config written to {}", path.display()).green());
            }
            Err(e) => {
                eprintln!("{}", format!("Failed to write config: {}", e).red());
                std::process::exit(1);
            }
        }
        return;
    }

    init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
