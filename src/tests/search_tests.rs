#[cfg(test)]
mod tests {
    use std::sync::atomic::{ AtomicBool, Ordering };
    use std::sync::Arc;
    use std::time::{ Duration, Instant };

    use crate::implementations::search::{ DebouncedSearch, PropertySearch, UserLookup };
    use crate::models::common::PropertyType;
    use crate::models::property::SearchQuery;
    use crate::tests::support::{ setup, FakeBackend };

    const DEBOUNCE: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn slow_older_term_never_overwrites_newer() {
        setup();
        let backend = FakeBackend::shared();
        backend.delay_search("ab", Duration::from_millis(200));
        let lookup = UserLookup::new(backend.clone(), Vec::new(), DEBOUNCE);

        lookup.type_term("ab");
        // Let "ab" get past the debounce and into its slow request
        tokio::time::sleep(Duration::from_millis(60)).await;
        lookup.type_term("abc");
        lookup.settle().await;
        tokio::time::sleep(Duration::from_millis(250)).await;

        let outcome = lookup.results().unwrap();
        assert_eq!(outcome.query, "abc");
        assert_eq!(outcome.generation, 2);
        assert_eq!(outcome.result, Ok(Vec::new()));
        assert_eq!(backend.count("search_users"), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn older_response_landing_after_newer_is_discarded() {
        setup();
        let search: Arc<DebouncedSearch<String, Vec<String>>> = Arc::new(DebouncedSearch::new(DEBOUNCE));
        let newer_landed_first = Arc::new(AtomicBool::new(false));

        let inner = Arc::clone(&search);
        let landed = Arc::clone(&newer_landed_first);
        search.issue("ab".to_string(), move |term| async move {
            // Superseded mid-request; this response still comes back, after the newer one
            inner.issue("abc".to_string(), |term| async move { Ok(vec![term]) });
            tokio::task::block_in_place(|| {
                let deadline = Instant::now() + Duration::from_secs(2);
                while inner.latest().is_none() && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(5));
                }
            });
            landed.store(inner.latest().is_some(), Ordering::SeqCst);
            Ok(vec![term])
        });

        // First settle waits for "ab", second for "abc"
        search.settle().await;
        search.settle().await;

        assert!(newer_landed_first.load(Ordering::SeqCst));
        let outcome = search.latest().unwrap();
        assert_eq!(outcome.generation, 2);
        assert_eq!(outcome.query, "abc");
        assert_eq!(outcome.result, Ok(vec!["abc".to_string()]));
    }

    #[tokio::test]
    async fn rapid_typing_sends_one_request() {
        setup();
        let backend = FakeBackend::shared();
        let lookup = UserLookup::new(backend.clone(), vec!["u-owner".to_string()], DEBOUNCE);

        lookup.type_term("k");
        lookup.type_term("ka");
        lookup.type_term("kam");
        lookup.settle().await;

        assert_eq!(backend.calls(), vec!["search_users:kam".to_string()]);
        let users = lookup.results().unwrap().result.unwrap();
        let ids: Vec<String> = users.into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["u-buyer".to_string(), "u-abc".to_string()]);
    }

    #[tokio::test]
    async fn blank_term_clears_without_a_request() {
        setup();
        let backend = FakeBackend::shared();
        let lookup = UserLookup::new(backend.clone(), Vec::new(), DEBOUNCE);

        lookup.type_term("   ");
        lookup.settle().await;
        assert_eq!(lookup.results().unwrap().result, Ok(Vec::new()));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn property_search_applies_text_to_latest_results() {
        setup();
        let backend = FakeBackend::shared();
        let search = PropertySearch::new(backend.clone(), DEBOUNCE);

        search.update(SearchQuery {
            property_type: Some(PropertyType::Residential),
            text: "p3".to_string(),
            ..SearchQuery::default()
        });
        search.settle().await;

        let visible = search.visible().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "p3");
        assert_eq!(search.outcome().map(|o| o.result.map(|r| r.len())), Some(Ok(2)));
    }

    #[tokio::test]
    async fn search_failure_is_reported_not_thrown() {
        setup();
        let backend = FakeBackend::shared();
        backend.fail_next("search_properties", crate::errors::RegistryError::Network("reset".into()));
        let search = PropertySearch::new(backend.clone(), DEBOUNCE);

        search.update(SearchQuery::default());
        search.settle().await;
        let report = search.visible().unwrap_err();
        assert_eq!(report.message, "Network error: reset");
    }
}
