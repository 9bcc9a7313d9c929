use super::*;

#[tokio::test]
async fn test_example_cycle_announces_once() {
    // WatchEntry {owner: U1, query: "figure A"}; adapter S1 returns item 123.
    let db = test_database().await;
    register(&db, "U1", "chan-1", "figure A").await;

    let adapter = QueryAdapter::new("s1", |_query| Ok(vec![listing("s1", "123", "Figure A v2")]));
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));

    // First cycle: the item is new, marked, and delivered once.
    let report = scheduler.run_cycle().await;
    assert_eq!(report.items_new, 1);
    assert_eq!(report.deliveries, 1);

    // Second cycle, same adapter output: already announced, notifier quiet.
    let report = scheduler.run_cycle().await;
    assert_eq!(report.items_new, 0);
    assert_eq!(report.deliveries, 0);

    assert_eq!(
        notifier.recorded(),
        vec![(
            "chan-1".to_string(),
            "123".to_string(),
            "Figure A v2".to_string()
        )]
    );
}

#[tokio::test]
async fn test_malformed_query_does_not_block_others() {
    let db = test_database().await;
    register(&db, "U1", "chan-1", "foo").await;
    register(&db, "U1", "chan-1", "bar").await;

    let adapter = QueryAdapter::new("s1", |query| {
        if query == "foo" {
            Err(FetchError::Payload("upstream returned garbage".into()))
        } else {
            Ok(vec![listing("s1", "bar-1", "bar listing")])
        }
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));

    let report = scheduler.run_cycle().await;

    assert_eq!(report.fetch_failures.len(), 1);
    assert_eq!(report.fetch_failures[0].query, "foo");
    assert_eq!(report.deliveries, 1);
    assert_eq!(notifier.recorded()[0].1, "bar-1");
}

#[tokio::test]
async fn test_dedup_survives_scheduler_restart() {
    let db = test_database().await;
    register(&db, "U1", "chan-1", "figure A").await;

    let notifier = Arc::new(RecordingNotifier::default());
    let adapter = QueryAdapter::new("s1", |_| Ok(vec![listing("s1", "123", "Figure A v2")]));
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));
    scheduler.run_cycle().await;
    drop(scheduler);

    // A fresh scheduler over the same store must not re-announce.
    let adapter = QueryAdapter::new("s1", |_| Ok(vec![listing("s1", "123", "Figure A v2")]));
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));
    let report = scheduler.run_cycle().await;

    assert_eq!(report.items_new, 0);
    assert_eq!(notifier.recorded().len(), 1);
}

#[tokio::test]
async fn test_same_item_id_from_different_sources_is_distinct() {
    let db = test_database().await;
    register(&db, "U1", "chan-1", "figure A").await;

    let mercari = QueryAdapter::new("mercari", |_| Ok(vec![listing("mercari", "123", "from mercari")]));
    let yahoo = QueryAdapter::new("yahoo", |_| Ok(vec![listing("yahoo", "123", "from yahoo")]));
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = scheduler_over(&db, vec![mercari, yahoo], Arc::clone(&notifier));

    let report = scheduler.run_cycle().await;

    // The dedup key includes the source, so both announce.
    assert_eq!(report.items_new, 2);
    assert_eq!(report.deliveries, 2);
}

#[tokio::test]
async fn test_distinct_queries_fan_out_independently() {
    let db = test_database().await;
    register(&db, "U1", "chan-1", "query one").await;
    register(&db, "U2", "chan-2", "query two").await;

    let adapter = QueryAdapter::new("s1", |query| {
        let id = format!("{query}-item");
        Ok(vec![listing("s1", &id, query)])
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));

    let report = scheduler.run_cycle().await;

    assert_eq!(report.queries, 2);
    assert_eq!(report.fetches, 2);
    assert_eq!(report.deliveries, 2);

    let channels: Vec<String> = notifier.recorded().into_iter().map(|(c, ..)| c).collect();
    assert!(channels.contains(&"chan-1".to_string()));
    assert!(channels.contains(&"chan-2".to_string()));
}
