//! Property-Based Tests for the Request Router

use axum::http::Method;
use proptest::prelude::*;
use tokio_test::block_on;

use crate::models::{FetchRequest, FetchResponse};
use crate::worker::test_support::*;
use crate::worker::{EventOutcome, WorkerEvent};

// == Strategies ==
fn non_get_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::POST),
        Just(Method::PUT),
        Just(Method::DELETE),
        Just(Method::PATCH),
        Just(Method::HEAD),
        Just(Method::OPTIONS),
    ]
}

fn path_strategy() -> impl Strategy<Value = String> {
    "/(api/)?[a-z0-9_]{1,16}(\\.js|\\.css|\\.html)?".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Non-GET requests are never intercepted and never touch the cache or
    // the worker's network.
    #[test]
    fn prop_non_get_is_never_intercepted(method in non_get_method(), path in path_strategy()) {
        block_on(async {
            let h = active_harness().await;
            let fetches_before = h.network.fetch_count();
            let entries_before = h.worker.current_cache().await.len().await;

            let request = FetchRequest::new(method, url(&path)).with_body("payload");
            let outcome = h.worker.dispatch(WorkerEvent::Fetch(request)).await.unwrap();

            assert!(matches!(outcome, EventOutcome::Passthrough));
            assert_eq!(h.network.fetch_count(), fetches_before);
            assert_eq!(h.worker.current_cache().await.len().await, entries_before);
        });
    }

    // A successful network-first document fetch leaves the cache holding
    // exactly what was served.
    #[test]
    fn prop_document_write_back_matches_served(path in path_strategy(), body in "[a-z ]{0,64}") {
        block_on(async {
            let h = active_harness().await;
            h.network.set_route(&url(&path), FetchResponse::ok(body.clone())).await;

            let served = h.worker.handle_fetch(&FetchRequest::navigate(url(&path))).await.unwrap();
            let cached = h.worker.current_cache().await.match_url(&url(&path)).await.unwrap();

            assert_eq!(&served.body[..], body.as_bytes());
            assert_eq!(cached.body, served.body);
        });
    }
}
