use std::sync::{Arc, Mutex};

use chart_data::error::DataQualityWarning;
use chart_data::ingestion::json::{ingest_json_from_path, ingest_json_from_str};
use chart_data::ingestion::{IngestionFormat, IngestionOptions, ingest_from_path};
use chart_data::observability::{ChartDataObserver, DiagnosticContext};
use chart_data::store::ChartDataOptions;
use chart_data::types::{ColumnDef, Scalar};

#[derive(Default)]
struct RecordingObserver {
    warnings: Mutex<Vec<DataQualityWarning>>,
}

impl ChartDataObserver for RecordingObserver {
    fn on_warning(&self, _ctx: &DiagnosticContext, warning: &DataQualityWarning) {
        self.warnings.lock().unwrap().push(warning.clone());
    }
}

#[test]
fn json_and_csv_fixtures_produce_equal_stores() {
    let defs = [ColumnDef::new("year"), ColumnDef::new("country"), ColumnDef::new("gdp"), ColumnDef::new("region")];
    let from_json = ingest_from_path("tests/fixtures/gdp.json", &defs, &IngestionOptions::default()).unwrap();
    let from_csv = ingest_from_path("tests/fixtures/gdp.csv", &defs, &IngestionOptions::default()).unwrap();
    assert_eq!(from_json, from_csv);
}

#[test]
fn ndjson_values_without_a_scalar_form_become_null_with_warnings() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ChartDataOptions {
        observer: Some(obs.clone()),
    };
    let data = ingest_json_from_path("tests/fixtures/events.ndjson", &[], &opts).unwrap();

    assert_eq!(data.row_count(), 3);
    assert_eq!(
        data.columns().keys().collect::<Vec<_>>(),
        vec!["t", "kind", "flagged", "tags"]
    );
    assert_eq!(
        data.get_column_data("flagged").unwrap(),
        vec![Scalar::Null, Scalar::Null, Scalar::Null]
    );

    let warnings = obs.warnings.lock().unwrap().clone();
    assert_eq!(
        warnings,
        vec![
            DataQualityWarning::CoercedToNull {
                row: 1,
                column: "flagged".to_string()
            },
            DataQualityWarning::CoercedToNull {
                row: 2,
                column: "tags".to_string()
            },
        ]
    );
}

#[test]
fn undeclared_keys_are_dropped_without_warnings() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Json),
        observer: Some(obs.clone()),
    };
    let data = ingest_from_path(
        "tests/fixtures/events.ndjson",
        &[ColumnDef::new("t"), ColumnDef::new("kind")],
        &opts,
    )
    .unwrap();

    assert_eq!(data.columns().len(), 2);
    assert!(data.rows().iter().all(|r| r.len() == 2));
    assert!(data.column("t").unwrap().is_continuous);
    assert!(obs.warnings.lock().unwrap().is_empty());
}

#[test]
fn declared_columns_missing_from_every_record_are_kept_empty() {
    let data = ingest_json_from_str(
        r#"[{"a": 1}, {"a": 2}]"#,
        &[ColumnDef::new("a"), ColumnDef::new("b")],
        &ChartDataOptions::default(),
    )
    .unwrap();
    assert_eq!(data.get_column_data("b").unwrap(), vec![Scalar::Null, Scalar::Null]);
    assert!(!data.column("b").unwrap().is_continuous);
    assert_eq!(data.max("b").unwrap(), None);
}
