use super::*;

#[test]
fn collecting_sink_accepts_concurrent_writers() {
    let sink = Arc::new(CollectingSink::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sink = sink.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    sink.send(SearchEvent::stats(false));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let sink = Arc::try_unwrap(sink).ok().unwrap();
    assert_eq!(sink.into_events().len(), 200);
}

#[test]
fn stats_event_carries_no_results() {
    let event = SearchEvent::stats(true);
    assert!(event.results.is_empty());
    assert!(event.stats.is_limit_hit);

    let event = SearchEvent::matches(Vec::new());
    assert!(!event.stats.is_limit_hit);
}

#[test]
fn channel_sink_forwards_and_tolerates_closed_receiver() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    SearchSink::send(&tx, SearchEvent::stats(true));
    assert_eq!(rx.try_recv().unwrap(), SearchEvent::stats(true));

    drop(rx);
    SearchSink::send(&tx, SearchEvent::stats(false));
}

#[test]
fn error_messages() {
    assert_eq!(
        SearchError::Client("shard down".to_string()).to_string(),
        "search backend error: shard down"
    );
    assert_eq!(SearchError::Cancelled.to_string(), "search cancelled");
}
