//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: paged HTTP listing → paginator → store → search view

use catalog_pager::catalog::{CatalogAction, CatalogSession, DetailsSession, Game, RawgSource};
use catalog_pager::config::CatalogConfig;
use catalog_pager::{
    from_fn, AccumulatorStore, Identify, PaginationState, Paginator, PageSource, Searchable,
    SearchOverlay,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn config_for(server: &MockServer) -> CatalogConfig {
    let mut config = CatalogConfig::default();
    config.base_url = server.uri();
    config.api_key = Some("test-key".into());
    config.http.max_retries = 0;
    config.http.rate_limit = None;
    config
}

async fn mount_page(server: &MockServer, page: u32, games: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("page", page.to_string()))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "results": games
        })))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer) {
    mount_page(
        server,
        1,
        json!([
            {"id": 1, "name": "Game 1", "rating": 4.1},
            {"id": 2, "name": "Game 2", "rating": 3.9},
            {"id": 3, "name": "Another", "rating": 4.8}
        ]),
    )
    .await;
    mount_page(
        server,
        2,
        json!([
            {"id": 3, "name": "Another", "rating": 4.8},
            {"id": 10, "name": "Game 10", "rating": 2.0}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Invalid page."})))
        .mount(server)
        .await;
}

fn names(games: &[Game]) -> Vec<&str> {
    games.iter().map(|g| g.name.as_str()).collect()
}

// ============================================================================
// HTTP Catalog Flow
// ============================================================================

#[tokio::test]
async fn test_browse_whole_catalog() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let session = CatalogSession::from_config(config_for(&server)).unwrap();

    session.start();
    let state = session.settled().await;
    assert_eq!(names(&state.games), vec!["Game 1", "Game 2", "Another"]);
    assert!(state.can_load_more());

    session.dispatch(CatalogAction::LoadMore);
    let state = session.settled().await;
    assert_eq!(
        names(&state.games),
        vec!["Game 1", "Game 2", "Another", "Game 10"]
    );

    session.dispatch(CatalogAction::LoadMore);
    let state = session.settled().await;
    assert!(state.end_reached());
    assert_eq!(state.games.len(), 4);
    assert_eq!(session.paginator().current_key(), 3);
}

#[tokio::test]
async fn test_search_over_fetched_pages() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let session = CatalogSession::from_config(config_for(&server)).unwrap();
    session.start();
    session.settled().await;
    session.dispatch(CatalogAction::LoadMore);
    session.settled().await;

    session.dispatch(CatalogAction::ToggleSearch);
    session.dispatch(CatalogAction::Search("GAME 1".into()));
    let state = session.snapshot();
    assert!(state.search_active);
    assert_eq!(names(&state.games), vec!["Game 1", "Game 10"]);

    session.dispatch(CatalogAction::ToggleSearch);
    let state = session.snapshot();
    assert_eq!(state.search_query, "");
    assert_eq!(state.games.len(), 4);
}

#[tokio::test]
async fn test_transient_failure_then_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_listing(&server).await;

    let session = CatalogSession::from_config(config_for(&server)).unwrap();
    session.start();
    let state = session.settled().await;

    assert!(state.can_retry());
    assert!(state.games.is_empty());
    let message = state.error_message().unwrap();
    assert!(message.contains("page 1"), "unexpected message: {message}");
    assert!(message.contains("503"), "unexpected message: {message}");

    session.dispatch(CatalogAction::Retry);
    let state = session.settled().await;
    assert_eq!(state.pagination, PaginationState::Idle);
    assert_eq!(state.games.len(), 3);
}

#[tokio::test]
async fn test_refresh_reloads_first_page() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let session = CatalogSession::from_config(config_for(&server)).unwrap();
    session.start();
    session.settled().await;
    session.dispatch(CatalogAction::LoadMore);
    session.settled().await;
    assert_eq!(session.loaded().len(), 4);

    session.dispatch(CatalogAction::Refresh);
    let state = session.settled().await;
    assert_eq!(names(&state.games), vec!["Game 1", "Game 2", "Another"]);
    assert_eq!(session.paginator().current_key(), 2);
}

#[tokio::test]
async fn test_paginator_over_http_source_directly() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let store = AccumulatorStore::new();
    let sink = store.clone();
    let paginator = Paginator::builder(RawgSource::new(config_for(&server)).unwrap())
        .on_success(move |games: Vec<Game>, _| sink.append(games))
        .build()
        .unwrap();

    for _ in 0..3 {
        paginator.load_next();
        paginator.settled().await;
    }

    assert_eq!(paginator.state(), PaginationState::EndReached);
    assert_eq!(store.len(), 4);
    assert!(store.contains(&10));
}

#[tokio::test]
async fn test_details_after_browsing() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/games/3"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "name": "Another",
            "description_raw": "A game about another game.",
            "genres": [{"name": "Puzzle"}]
        })))
        .mount(&server)
        .await;

    let session = CatalogSession::from_config(config_for(&server)).unwrap();
    session.start();
    let state = session.settled().await;
    let picked = state.games.iter().find(|g| g.name == "Another").unwrap().id;

    let details = DetailsSession::new(RawgSource::new(config_for(&server)).unwrap());
    let shown = details.load(picked).await;

    let record = shown.details.unwrap();
    assert_eq!(record.description, "A game about another game.");
    assert_eq!(record.released, "Unknown");
    assert_eq!(record.genres, vec!["Puzzle"]);
}

// ============================================================================
// Generic Engine Flow
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Track {
    id: u32,
    title: String,
}

impl Identify for Track {
    type Key = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

impl Searchable for Track {
    fn display_name(&self) -> &str {
        &self.title
    }
}

fn track_source(calls: Arc<AtomicUsize>) -> impl PageSource<Track> {
    from_fn(move |page| {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let tracks = match page {
                0 => vec![(1, "Blue Monday"), (2, "Bizarre Love Triangle")],
                1 => vec![(2, "Bizarre Love Triangle"), (3, "Regret")],
                _ => vec![],
            };
            Ok(tracks
                .into_iter()
                .map(|(id, title)| Track {
                    id,
                    title: title.to_string(),
                })
                .collect())
        }
    })
}

#[tokio::test]
async fn test_generic_engine_with_zero_based_keys() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = AccumulatorStore::new();
    let sink = store.clone();
    let paginator = Paginator::builder(track_source(Arc::clone(&calls)))
        .initial_key(0)
        .on_success(move |tracks, _| sink.append(tracks))
        .build()
        .unwrap();
    let overlay = SearchOverlay::new(store.clone());

    paginator.load_next();
    assert_eq!(paginator.state(), PaginationState::InitialLoading);
    paginator.settled().await;

    paginator.load_next();
    assert_eq!(paginator.state(), PaginationState::PageLoading);
    paginator.settled().await;

    paginator.load_next();
    assert_eq!(paginator.settled().await, PaginationState::EndReached);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let ids: Vec<u32> = store.all().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    overlay.set_query("b");
    let titles: Vec<String> = overlay.view().iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["Blue Monday", "Bizarre Love Triangle"]);

    overlay.set_query("");
    assert!(Arc::ptr_eq(&overlay.view(), &store.all()));

    paginator.reset();
    assert_eq!(paginator.state(), PaginationState::Idle);
    assert_eq!(paginator.current_key(), 0);
    assert_eq!(store.len(), 3);
}
