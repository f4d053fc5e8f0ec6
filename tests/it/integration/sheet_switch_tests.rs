//! Sheet-switch behavior: buffer reset, metadata re-derivation, and the
//! workbook provider against a real XLSX fixture.

use crate::helpers::{row_label, workbook_fixture, StubProvider, StubSheet};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tableview::loader::{LoadPhase, LoaderConfig, ProgressiveLoader};
use tableview::provider::{DataProvider, WorkbookProvider};
use tableview::source::FileSource;
use tableview::value::Value;

fn test_config() -> LoaderConfig {
    LoaderConfig {
        initial_row_cap: 200,
        sub_chunk_rows: 50,
        load_more_rows: 200,
        load_more_margin: 10,
    }
}

fn two_sheet_stub() -> Arc<StubProvider> {
    Arc::new(StubProvider::with_sheets(vec![
        StubSheet {
            name: "first",
            rows: 300,
        },
        StubSheet {
            name: "second",
            rows: 40,
        },
    ]))
}

#[tokio::test]
async fn test_switch_resets_buffer_and_reloads() {
    let provider = two_sheet_stub();
    let loader = ProgressiveLoader::new(provider.clone(), test_config());

    loader.start().await.unwrap();
    {
        let view = loader.view();
        let view = view.read();
        assert_eq!(view.loaded_rows(), 200);
        assert_eq!(view.total_rows(), 300);
        assert!(row_label(view.row(0).unwrap()).ends_with("-s0"));
    }

    loader.switch_sheet(1).await.unwrap();
    {
        let view = loader.view();
        let view = view.read();
        assert_eq!(view.total_rows(), 40);
        assert_eq!(view.loaded_rows(), 40);
        assert_eq!(view.active_sheet(), 1);
        // Every row in the buffer belongs to the new sheet.
        for i in 0..view.loaded_rows() {
            assert!(row_label(view.row(i).unwrap()).ends_with("-s1"));
        }
    }
    // Metadata was re-derived, not served from the old sheet's cache.
    assert_eq!(provider.metadata_calls.load(Ordering::SeqCst), 2);
    assert_eq!(loader.phase(), LoadPhase::Ready);
}

#[tokio::test]
async fn test_switch_clears_view_state() {
    let provider = two_sheet_stub();
    let loader = ProgressiveLoader::new(provider, test_config());
    loader.start().await.unwrap();

    {
        let view = loader.view();
        let mut view = view.write();
        view.set_global_filter("row-1");
        view.toggle_sort("idx");
    }

    loader.switch_sheet(1).await.unwrap();
    let view = loader.view();
    let view = view.read();
    assert!(view.sorting().is_none());
    assert_eq!(view.visible_row_count(), view.loaded_rows());
}

#[tokio::test]
async fn test_switch_to_missing_sheet_errors() {
    let provider = two_sheet_stub();
    let loader = ProgressiveLoader::new(provider, test_config());
    loader.start().await.unwrap();

    assert!(loader.switch_sheet(7).await.is_err());
    assert_eq!(loader.phase(), LoadPhase::Error);
    // The old sheet's rows were already discarded by the reset.
    assert_eq!(loader.view().read().loaded_rows(), 0);
}

#[test]
fn test_workbook_provider_switches_sheets() {
    let fixture = workbook_fixture();
    let source = Arc::new(FileSource::open(fixture.path()).unwrap());
    let provider = WorkbookProvider::new(source);

    let meta = provider.load_metadata().unwrap();
    assert_eq!(
        meta.sheets,
        Some(vec!["Sheet1".to_string(), "Sheet2".to_string()])
    );
    assert_eq!(meta.num_rows, 3);
    assert_eq!(meta.columns[0].name, "name");
    assert_eq!(meta.columns[1].type_tag, "number");

    let rows = provider.load_data(0, 10).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], Value::Str("alice".to_string()));
    assert_eq!(rows[0]["age"], Value::Float(30.0));

    provider.switch_sheet(1).unwrap();
    let meta2 = provider.load_metadata().unwrap();
    assert_eq!(meta2.num_rows, 2);
    assert_eq!(meta2.columns[0].name, "city");

    let rows2 = provider.load_data(0, 10).unwrap();
    assert_eq!(rows2.len(), 2);
    assert_eq!(rows2[1]["city"], Value::Str("lyon".to_string()));
    assert_eq!(rows2[1]["population"], Value::Float(520_000.0));
}

#[tokio::test]
async fn test_sheet_switch_scenario_end_to_end() {
    let fixture = workbook_fixture();
    let source = Arc::new(FileSource::open(fixture.path()).unwrap());
    let provider: Arc<dyn DataProvider> = Arc::new(WorkbookProvider::new(source));
    let loader = ProgressiveLoader::new(provider, LoaderConfig::default());

    loader.start().await.unwrap();
    assert_eq!(loader.view().read().loaded_rows(), 3);

    loader.switch_sheet(1).await.unwrap();
    let view = loader.view();
    let view = view.read();
    assert_eq!(view.total_rows(), 2);
    assert_eq!(view.loaded_rows(), 2);
    let names: Vec<&str> = view
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["city", "population"]);
}
