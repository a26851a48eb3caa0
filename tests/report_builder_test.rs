#[cfg(test)]
mod report_builder_tests {
    use chrono::NaiveDate;
    use ga_report::api_client::{
        ColumnHeader, MetricHeader, MetricHeaderEntry, MetricValues, QuerySpec, Report,
        ReportData, ReportRow,
    };
    use ga_report::error::{ReportError, Result};
    use ga_report::report_builder::{BuilderState, ReportBuilder};
    use ga_report::report_source::ReportSource;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FetchCall {
        page_size: u32,
        page_token: Option<String>,
    }

    /// Plays back a scripted sequence of page responses and records every
    /// fetch it serves.
    struct ScriptedSource {
        pages: RefCell<Vec<Result<Report>>>,
        calls: Rc<RefCell<Vec<FetchCall>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Report>>) -> (Self, Rc<RefCell<Vec<FetchCall>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let source = Self {
                pages: RefCell::new(pages),
                calls: Rc::clone(&calls),
            };
            (source, calls)
        }
    }

    impl ReportSource for ScriptedSource {
        fn fetch_page(
            &self,
            _query: &QuerySpec,
            page_size: u32,
            page_token: Option<&str>,
        ) -> Result<Report> {
            self.calls.borrow_mut().push(FetchCall {
                page_size,
                page_token: page_token.map(str::to_string),
            });
            let mut pages = self.pages.borrow_mut();
            assert!(!pages.is_empty(), "fetch beyond the scripted pages");
            pages.remove(0)
        }
    }

    fn header() -> ColumnHeader {
        ColumnHeader {
            dimensions: vec!["ga:country".to_string(), "ga:city".to_string()],
            metric_header: MetricHeader {
                metric_header_entries: vec![MetricHeaderEntry {
                    name: "ga:sessions".to_string(),
                }],
            },
        }
    }

    fn page(rows: &[(&[&str], &[&str])], token: Option<&str>) -> Report {
        Report {
            column_header: header(),
            data: ReportData {
                rows: rows
                    .iter()
                    .map(|(dimensions, values)| ReportRow {
                        dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
                        metrics: vec![MetricValues {
                            values: values.iter().map(|v| v.to_string()).collect(),
                        }],
                    })
                    .collect(),
                row_count: Some(rows.len() as u64),
            },
            next_page_token: token.map(str::to_string),
        }
    }

    fn builder(source: ScriptedSource) -> ReportBuilder<ScriptedSource> {
        let mut builder = ReportBuilder::new(
            source,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .with_page_size(100);
        builder
            .set_dimensions(&["ga:country", "ga:city"])
            .unwrap();
        builder.set_metrics(&["ga:sessions"]).unwrap();
        builder
    }

    #[test]
    fn test_two_page_report_concatenates_in_order() {
        let (source, calls) = ScriptedSource::new(vec![
            Ok(page(&[(&["US", "NYC"], &["1"])], None)),
            Ok(page(
                &[(&["US", "NYC"], &["42"]), (&["US", "LA"], &["17"])],
                Some("token-100"),
            )),
            Ok(page(&[(&["UK", "London"], &["7"])], None)),
        ]);
        let mut builder = builder(source);

        builder.discover_columns().unwrap();
        let records = builder.build_report().unwrap().to_vec();

        // Probe at size 1, then exactly two pages at the configured size,
        // the second carrying page one's token.
        assert_eq!(
            *calls.borrow(),
            vec![
                FetchCall {
                    page_size: 1,
                    page_token: None
                },
                FetchCall {
                    page_size: 100,
                    page_token: None
                },
                FetchCall {
                    page_size: 100,
                    page_token: Some("token-100".to_string())
                },
            ]
        );

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["ga:city"], "NYC");
        assert_eq!(records[1]["ga:city"], "LA");
        assert_eq!(records[2]["ga:city"], "London");
        assert_eq!(records[2]["ga:sessions"], "7");
        assert_eq!(builder.state(), BuilderState::Complete);
        assert_eq!(builder.records().len(), 3);
    }

    #[test]
    fn test_flatten_example_through_builder() {
        let (source, _calls) = ScriptedSource::new(vec![
            Ok(page(&[(&["US", "NYC"], &["42"])], None)),
            Ok(page(&[(&["US", "NYC"], &["42"])], None)),
        ]);
        let mut builder = builder(source);

        builder.discover_columns().unwrap();
        let records = builder.build_report().unwrap();

        assert_eq!(records[0]["ga:country"], "US");
        assert_eq!(records[0]["ga:city"], "NYC");
        assert_eq!(records[0]["ga:sessions"], "42");
    }

    #[test]
    fn test_mid_pagination_failure_discards_partial_result() {
        let (source, calls) = ScriptedSource::new(vec![
            Ok(page(&[(&["US", "NYC"], &["1"])], None)),
            Ok(page(&[(&["US", "NYC"], &["42"])], Some("token-100"))),
            Err(ReportError::Api {
                status: 500,
                message: "backend error".to_string(),
            }),
            // Retry succeeds from scratch
            Ok(page(&[(&["US", "NYC"], &["42"])], None)),
        ]);
        let mut builder = builder(source);

        builder.discover_columns().unwrap();
        let err = builder.build_report().unwrap_err();
        assert!(matches!(err, ReportError::Api { status: 500, .. }));

        // Partial pages are discarded, but the discovered columns survive
        // for a from-scratch retry.
        assert!(builder.records().is_empty());
        assert_eq!(builder.state(), BuilderState::ColumnsDiscovered);
        assert!(builder.columns().is_some());

        let records = builder.build_report().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(calls.borrow().len(), 4);
    }

    #[test]
    fn test_sample_does_not_paginate() {
        let (source, calls) = ScriptedSource::new(vec![
            Ok(page(&[(&["US", "NYC"], &["1"])], None)),
            // A token on a sample page must not be followed
            Ok(page(&[(&["US", "NYC"], &["42"])], Some("token-100"))),
        ]);
        let mut builder = builder(source);

        builder.discover_columns().unwrap();
        let sample = builder.sample(50).unwrap();

        assert_eq!(sample.len(), 1);
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(calls.borrow()[1].page_size, 50);
        // Sampling leaves the stored run result untouched
        assert!(builder.records().is_empty());
    }

    #[test]
    fn test_discover_columns_is_idempotent() {
        let (source, _calls) = ScriptedSource::new(vec![
            Ok(page(&[(&["US", "NYC"], &["1"])], None)),
            Ok(page(&[(&["US", "NYC"], &["1"])], None)),
        ]);
        let mut builder = builder(source);

        let first = builder.discover_columns().unwrap().clone();
        let second = builder.discover_columns().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(
            first.column_names(),
            ["ga:country", "ga:city", "ga:sessions"]
        );
    }

    #[test]
    fn test_build_report_before_discovery_is_precondition_error() {
        let (source, calls) = ScriptedSource::new(vec![]);
        let mut builder = builder(source);

        let err = builder.build_report().unwrap_err();
        assert!(matches!(err, ReportError::Precondition(_)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_result_set_yields_no_records() {
        let (source, _calls) = ScriptedSource::new(vec![
            Ok(page(&[], None)),
            Ok(page(&[], None)),
        ]);
        let mut builder = builder(source);

        builder.discover_columns().unwrap();
        let records = builder.build_report().unwrap();
        assert!(records.is_empty());
        assert_eq!(builder.state(), BuilderState::Complete);
    }
}
