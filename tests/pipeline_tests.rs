// End-to-end library tests: CSV source -> pipeline -> renderers

use racebar::bucket::Granularity;
use racebar::csv_output::to_csv;
use racebar::json_output::JsonFrameBundle;
use racebar::loader::{CsvEventSource, LoadError, LoaderConfig, MalformedPolicy};
use racebar::pipeline::{Pipeline, PipelineConfig, WindowSpec};
use racebar::render::{rank_period, RenderConfig, Renderer, TextRenderer};

const EXPORT: &str = "\
id,name,date_creation,investigator_name
10,\"Roland, the Detective\",2021-01-15T10:00:00+00:00,Roland Banks
11,Roland again,2021-02-03T23:30:00-05:00,Roland Banks
12,Agnes,2021-02-10T08:00:00+00:00,Agnes Baker
13,Agnes,2021-02-10T08:00:00+00:00,Agnes Baker
14,Roland three,2021-03-01T09:00:00+00:00,Roland Banks
15,Agnes two,2021-03-20T09:00:00+00:00,Agnes Baker
16,Agnes three,2021-04-02T09:00:00+00:00,Agnes Baker
";

fn run(config: PipelineConfig) -> racebar::pipeline::PipelineOutput {
    let mut source = CsvEventSource::new(EXPORT.as_bytes(), config.loader.clone());
    Pipeline::new(config).unwrap().run_source(&mut source).unwrap()
}

#[test]
fn test_reference_windows_over_export() {
    let output = run(PipelineConfig::default());

    assert_eq!(output.summary.rows_read, 7);
    assert_eq!(output.summary.duplicates_dropped, 1);
    assert_eq!(output.summary.events_kept, 6);
    assert_eq!(output.day_counts.columns(), &["Agnes Baker", "Roland Banks"]);

    // Local wall-clock date: 23:30 at -05:00 stays on 2021-02-03
    let roland = output.day_counts.column("Roland Banks").unwrap();
    let feb3 = output
        .day_counts
        .rows()
        .iter()
        .position(|d| d.to_string() == "2021-02-03")
        .unwrap();
    assert_eq!(roland[feb3], 1);

    let names: Vec<&str> = output.rolling.iter().map(|s| s.spec.name.as_str()).collect();
    assert_eq!(names, vec!["30d", "90d", "3m", "6m"]);

    // (Month, 6, 3): partial sums from the third month on
    let six = &output.series("6m").unwrap().table;
    assert_eq!(six.rows(), &["2021-01", "2021-02", "2021-03", "2021-04"]);
    let agnes = six.column("Agnes Baker").unwrap();
    assert!(agnes[0].is_nan() && agnes[1].is_nan());
    assert_eq!(&agnes[2..], &[2.0, 3.0]);
}

#[test]
fn test_yearly_rate_post_processing() {
    let config = PipelineConfig {
        windows: vec![WindowSpec::new("6m", Granularity::Month, 6)
            .with_min_periods(3)
            .with_skip_rows(2)
            .with_scale(2.0)],
        ..PipelineConfig::default()
    };
    let output = run(config);

    let table = &output.series("6m").unwrap().table;
    assert_eq!(table.rows(), &["2021-03", "2021-04"]);
    assert_eq!(table.column("Roland Banks"), Some(vec![6.0, 6.0]));
    assert_eq!(table.column("Agnes Baker"), Some(vec![4.0, 6.0]));

    let csv = to_csv(table);
    assert_eq!(csv, "period,Agnes Baker,Roland Banks\n2021-03,4,6\n2021-04,6,6\n");

    let bars = rank_period(table, 1, &RenderConfig::default());
    assert_eq!(bars, vec![("Agnes Baker", 6.0), ("Roland Banks", 6.0)]);
}

#[test]
fn test_text_and_json_renderers_agree_on_periods() {
    let output = run(PipelineConfig::default());
    let series = output.series("3m").unwrap();
    let config = RenderConfig::default();

    let mut text = TextRenderer::new(Vec::new());
    text.render(&series.table, &config).unwrap();
    let text = String::from_utf8(text.into_inner()).unwrap();

    let bundle = JsonFrameBundle::new(&series.table, &config);
    for period in &bundle.periods {
        assert!(text.contains(&format!("== {} ==", period)));
    }
    assert_eq!(bundle.to_table().unwrap().n_rows(), series.table.n_rows());
}

#[test]
fn test_skip_policy_through_source() {
    let export = "\
investigator_name,date_creation
Roland Banks,2021-01-01
,2021-01-02
Agnes Baker,yesterday
Agnes Baker,2021-01-03
";
    let loader = LoaderConfig {
        on_malformed: MalformedPolicy::Skip,
        ..LoaderConfig::default()
    };
    let config = PipelineConfig {
        loader: loader.clone(),
        ..PipelineConfig::default()
    };

    let mut source = CsvEventSource::new(export.as_bytes(), loader);
    let output = Pipeline::new(config).unwrap().run_source(&mut source).unwrap();

    assert_eq!(output.summary.rows_read, 4);
    assert_eq!(output.summary.rows_skipped, 2);
    assert_eq!(output.day_counts.n_rows(), 3);
}

#[test]
fn test_fail_policy_reports_line() {
    let export = "investigator_name,date_creation\nRoland Banks,2021-01-01\nAgnes Baker,soon\n";
    let mut source = CsvEventSource::new(export.as_bytes(), LoaderConfig::default());

    let err = Pipeline::new(PipelineConfig::default())
        .unwrap()
        .run_source(&mut source)
        .unwrap_err();
    match err.downcast_ref::<LoadError>() {
        Some(LoadError::MalformedRow { line, .. }) => assert_eq!(*line, 3),
        other => panic!("unexpected error: {:?}", other),
    }
}
