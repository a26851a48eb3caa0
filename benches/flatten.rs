use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ga_report::api_client::{
    ColumnHeader, MetricHeader, MetricHeaderEntry, MetricValues, ReportData, ReportRow,
};
use ga_report::columns::ColumnSet;

fn create_test_page(rows: usize) -> (ColumnSet, ReportData) {
    let header = ColumnHeader {
        dimensions: vec!["ga:country".to_string(), "ga:city".to_string()],
        metric_header: MetricHeader {
            metric_header_entries: vec![
                MetricHeaderEntry {
                    name: "ga:sessions".to_string(),
                },
                MetricHeaderEntry {
                    name: "ga:pageviews".to_string(),
                },
            ],
        },
    };

    let countries = ["US", "UK", "DE", "FR", "JP"];
    let cities = ["NYC", "London", "Berlin", "Paris", "Tokyo"];

    let data = ReportData {
        rows: (0..rows)
            .map(|i| ReportRow {
                dimensions: vec![
                    countries[i % countries.len()].to_string(),
                    cities[i % cities.len()].to_string(),
                ],
                metrics: vec![MetricValues {
                    values: vec![i.to_string(), (i * 3).to_string()],
                }],
            })
            .collect(),
        row_count: Some(rows as u64),
    };

    (ColumnSet::from_header(&header), data)
}

fn benchmark_flatten(c: &mut Criterion) {
    let (columns_10k, page_10k) = create_test_page(10_000);
    let (columns_50k, page_50k) = create_test_page(50_000);

    let mut group = c.benchmark_group("flatten_page");

    group.bench_function("10k_rows", |b| {
        b.iter(|| {
            let records = columns_10k.flatten(black_box(&page_10k));
            assert_eq!(records.len(), 10_000);
        });
    });

    group.bench_function("50k_rows", |b| {
        b.iter(|| {
            let records = columns_50k.flatten(black_box(&page_50k));
            assert_eq!(records.len(), 50_000);
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_flatten);
criterion_main!(benches);
