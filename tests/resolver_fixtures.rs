mod common;

use common::{ScriptedFetch, read_fixture_bytes};
use edgarsum::{
    EdgarError, FileTickerStore, IdentifierResolver, MemoryTickerStore, TickerStore,
    parse_ticker_map,
};
use tempfile::TempDir;

#[test]
fn parse_ticker_fixture() {
    let map = parse_ticker_map(&read_fixture_bytes("tickers/company_tickers.json")).unwrap();
    assert_eq!(map.len(), 5);
    assert_eq!(map["AAPL"], "320193");
    assert_eq!(map["GOOGL"], "1652044");
    assert_eq!(map["BRK-B"], "1067983");
}

#[tokio::test]
async fn resolve_ticker_downloads_map_once() {
    let client = ScriptedFetch::new().with_tickers();
    let resolver = IdentifierResolver::new(MemoryTickerStore::new());

    let apple = resolver.resolve(&client, " aapl ").await.unwrap();
    assert_eq!(apple.cik10(), "0000320193");
    assert_eq!(apple.ticker(), Some("AAPL"));

    let msft = resolver.resolve(&client, "MSFT").await.unwrap();
    assert_eq!(msft.cik10(), "0000789019");

    assert_eq!(client.call_count(), 1);
    assert_eq!(resolver.store().snapshot().unwrap().len(), 5);
}

#[tokio::test]
async fn resolve_cik_never_fetches() {
    let client = ScriptedFetch::new();
    let resolver = IdentifierResolver::new(MemoryTickerStore::new());

    let company = resolver.resolve(&client, "320193").await.unwrap();
    assert_eq!(company.cik10(), "0000320193");
    assert_eq!(company.ticker(), None);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn unknown_ticker_is_not_found() {
    let client = ScriptedFetch::new().with_tickers();
    let resolver = IdentifierResolver::new(MemoryTickerStore::new());

    let result = resolver.resolve(&client, "ZZZZ").await;
    assert!(matches!(result, Err(EdgarError::NotFound(_))));
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let client = ScriptedFetch::new().with_tickers();
    let resolver = IdentifierResolver::new(MemoryTickerStore::new());

    for input in ["", "   ", "12345678901", "AA PL", "$AAPL"] {
        let result = resolver.resolve(&client, input).await;
        assert!(
            matches!(result, Err(EdgarError::InvalidIdentifier(_))),
            "{input:?} should be rejected"
        );
    }
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn file_store_serves_later_resolvers() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache/company_tickers.json");

    let client = ScriptedFetch::new().with_tickers();
    let first = IdentifierResolver::new(FileTickerStore::new(&cache));
    first.resolve(&client, "GOOG").await.unwrap();
    assert!(cache.exists());

    let offline = ScriptedFetch::new();
    let second = IdentifierResolver::new(FileTickerStore::new(&cache));
    let company = second.resolve(&offline, "goog").await.unwrap();
    assert_eq!(company.cik10(), "0001652044");
    assert_eq!(offline.call_count(), 0);
    assert_eq!(second.store().load().unwrap().unwrap()["BRK-B"], "1067983");
}

#[tokio::test]
async fn ticker_map_download_failure_propagates() {
    let client = ScriptedFetch::new();
    let resolver = IdentifierResolver::new(MemoryTickerStore::new());

    let result = resolver.resolve(&client, "AAPL").await;
    assert!(matches!(
        result,
        Err(EdgarError::RemoteRejected { status_code: 404, .. })
    ));
    assert!(resolver.store().snapshot().is_none());
}
