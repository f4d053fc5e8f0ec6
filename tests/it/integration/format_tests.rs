//! End-to-end format tests against generated fixtures.

use crate::helpers::{parquet_fixture, CountingSource};
use std::sync::Arc;
use tableview::loader::{LoadPhase, LoaderConfig, ProgressiveLoader};
use tableview::provider::{provider_for_tag, DataProvider, OrcProvider, ParquetProvider};
use tableview::source::MemorySource;
use tableview::value::Value;

#[test]
fn test_parquet_metadata_and_paging() {
    let counting = CountingSource::new(Arc::new(MemorySource::new(parquet_fixture(100))));
    let provider = ParquetProvider::new(counting.clone());

    let meta = provider.load_metadata().unwrap();
    assert_eq!(meta.num_rows, 100);
    assert_eq!(meta.num_columns, 3);
    assert_eq!(meta.columns[0].name, "id");
    assert_eq!(meta.columns[0].type_tag, "Int64");

    // The footer is parsed once; repeat metadata calls stay off the wire.
    let reads_after_meta = counting.reads();
    provider.load_metadata().unwrap();
    assert_eq!(counting.reads(), reads_after_meta);

    let rows = provider.load_data(0, 4).unwrap();
    assert_eq!(rows.len(), 4);
    // 64-bit fidelity straight out of the reader.
    assert_eq!(rows[0]["id"], Value::Int(i64::MAX));
    assert_eq!(rows[1]["id"], Value::Int(1));
    assert_eq!(rows[3]["name"], Value::Null);
    assert_eq!(rows[2]["ratio"], Value::Float(0.5));

    // Clamping at the tail.
    assert_eq!(provider.load_data(98, 10).unwrap().len(), 2);
    assert!(provider.load_data(100, 10).unwrap().is_empty());
    assert!(provider.load_data(1_000_000, 10).unwrap().is_empty());

    // An identical page re-reads identical ranges: all cache hits.
    let before = counting.reads();
    provider.load_data(0, 4).unwrap();
    assert_eq!(counting.reads(), before);
}

#[tokio::test]
async fn test_parquet_progressive_session() {
    let source = Arc::new(MemorySource::new(parquet_fixture(100)));
    let provider: Arc<dyn DataProvider> = Arc::new(ParquetProvider::new(source));
    let loader = ProgressiveLoader::new(provider, LoaderConfig::default());

    loader.start().await.unwrap();
    assert_eq!(loader.phase(), LoadPhase::Ready);
    let view = loader.view();
    let view = view.read();
    assert_eq!(view.loaded_rows(), 100);
    assert_eq!(view.columns().len(), 3);
}

#[test]
fn test_factory_tag_round_trip() {
    let source = Arc::new(MemorySource::new(parquet_fixture(5)));
    let provider = provider_for_tag("parquet", source).unwrap();
    assert_eq!(provider.format_name(), "parquet");
    assert_eq!(provider.load_metadata().unwrap().num_rows, 5);
}

#[test]
fn test_orc_rejects_garbage_with_parse_error() {
    let source = Arc::new(MemorySource::new(&b"definitely not an orc file"[..]));
    let provider = OrcProvider::new(source);
    let err = provider.load_metadata().unwrap_err();
    assert!(
        err.to_string().contains("orc"),
        "error lacks format name: {}",
        err
    );
}

#[test]
fn test_parquet_rejects_garbage_with_parse_error() {
    let source = Arc::new(MemorySource::new(&b"PAR0 not really parquet"[..]));
    let provider = ParquetProvider::new(source);
    let err = provider.load_metadata().unwrap_err();
    assert!(err.to_string().contains("parquet"), "got: {}", err);
}
