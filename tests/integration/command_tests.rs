use super::*;
use zenwatch::CommandHandler;

#[tokio::test]
async fn test_register_then_poll_picks_up_entry() {
    let db = test_database().await;
    let commands = CommandHandler::new(db.registry());

    let reply = commands.register("U1", "chan-9", "figure A").await.unwrap();
    assert_eq!(reply, "Registered alert for **figure A**!");

    let adapter = QueryAdapter::new("s1", |_| Ok(vec![listing("s1", "1", "hit")]));
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));

    scheduler.run_cycle().await;
    assert_eq!(notifier.recorded()[0].0, "chan-9");
}

#[tokio::test]
async fn test_unregister_removes_entry_from_polling() {
    let db = test_database().await;
    let commands = CommandHandler::new(db.registry());

    commands.register("U1", "chan-1", "figure A").await.unwrap();
    commands.unregister("U1", "figure A").await.unwrap();

    let adapter = QueryAdapter::new("s1", |_| Ok(vec![listing("s1", "1", "hit")]));
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = scheduler_over(&db, vec![adapter], Arc::clone(&notifier));

    let report = scheduler.run_cycle().await;
    assert_eq!(report.entries, 0);
    assert_eq!(report.fetches, 0);
    assert!(notifier.recorded().is_empty());
}

#[tokio::test]
async fn test_command_validation_replies() {
    let db = test_database().await;
    let commands = CommandHandler::new(db.registry());

    commands.register("U1", "chan-1", "figure A").await.unwrap();

    let reply = commands.register("U1", "chan-1", "figure A").await.unwrap();
    assert_eq!(reply, "Alert for **figure A** already exists!");

    let reply = commands.unregister("U1", "other").await.unwrap();
    assert_eq!(reply, "Alert for **other** does not exist!");

    let reply = commands.list_alerts("someone-else").await.unwrap();
    assert_eq!(reply, "You have no alerts!");

    let reply = commands.list_alerts("U1").await.unwrap();
    assert_eq!(reply, "figure A");
}
