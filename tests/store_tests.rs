// Persistence round-trip tests for the snapshot store and profile store.

use pairlink::models::{Gender, Preference, QueueEntry, Snapshot, UserId};
use pairlink::services::{connect, ProfileFields, ProfileStore, ReportStore, SessionStore};

#[tokio::test]
async fn save_then_load_reproduces_the_snapshot() {
    let pool = connect(":memory:").await.expect("db");
    let store = SessionStore::new(pool);

    let mut snapshot = Snapshot::default();
    snapshot.pairings.insert(UserId(10), UserId(20));
    snapshot.pairings.insert(UserId(20), UserId(10));
    snapshot.queue = vec![
        QueueEntry {
            user_id: UserId(1),
            gender: Gender::Male,
            preference: Preference::Any,
        },
        QueueEntry {
            user_id: UserId(2),
            gender: Gender::Female,
            preference: Preference::Gender(Gender::Male),
        },
        QueueEntry {
            user_id: UserId(3),
            gender: Gender::Undisclosed,
            preference: Preference::Any,
        },
    ];

    store.save(&snapshot).await.unwrap();
    let loaded = store.load().await.unwrap();

    // Identical pairing set and identical queue ordering
    assert_eq!(loaded.pairings, snapshot.pairings);
    assert_eq!(loaded.queue, snapshot.queue);
}

#[tokio::test]
async fn fresh_database_loads_empty() {
    let pool = connect(":memory:").await.expect("db");
    let store = SessionStore::new(pool);

    let snapshot = store.load().await.unwrap();
    assert!(snapshot.pairings.is_empty());
    assert!(snapshot.queue.is_empty());
}

#[tokio::test]
async fn later_save_overwrites_earlier() {
    let pool = connect(":memory:").await.expect("db");
    let store = SessionStore::new(pool);

    let mut first = Snapshot::default();
    first.queue.push(QueueEntry {
        user_id: UserId(1),
        gender: Gender::Male,
        preference: Preference::Any,
    });
    store.save(&first).await.unwrap();

    store.save(&Snapshot::default()).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert!(loaded.queue.is_empty());
}

#[tokio::test]
async fn profile_upsert_merges_fields() {
    let pool = connect(":memory:").await.expect("db");
    let profiles = ProfileStore::new(pool);

    profiles
        .upsert(
            UserId(1),
            ProfileFields {
                handle: Some("alex".to_string()),
                gender: Some(Gender::Male),
                age: None,
                bio: None,
            },
        )
        .await
        .unwrap();

    // Incomplete: the engine-facing lookup sees nothing yet
    assert!(profiles.get_profile(UserId(1)).await.unwrap().is_none());

    profiles
        .upsert(
            UserId(1),
            ProfileFields {
                handle: None,
                gender: None,
                age: Some(30),
                bio: Some("hello".to_string()),
            },
        )
        .await
        .unwrap();

    let profile = profiles.get_profile(UserId(1)).await.unwrap().unwrap();
    assert_eq!(profile.handle.as_deref(), Some("alex"));
    assert_eq!(profile.gender, Some(Gender::Male));
    assert_eq!(profile.age, Some(30));
    assert!(!profile.is_pro);
}

#[tokio::test]
async fn handle_lookup_strips_at_sign() {
    let pool = connect(":memory:").await.expect("db");
    let profiles = ProfileStore::new(pool);

    profiles.touch(UserId(9), Some("casey")).await.unwrap();

    assert_eq!(
        profiles.find_by_handle("@casey").await.unwrap(),
        Some(UserId(9))
    );
    assert_eq!(
        profiles.find_by_handle("casey").await.unwrap(),
        Some(UserId(9))
    );
    assert_eq!(profiles.find_by_handle("@nobody").await.unwrap(), None);
}

#[tokio::test]
async fn summary_uses_placeholders_for_missing_profiles() {
    let pool = connect(":memory:").await.expect("db");
    let profiles = ProfileStore::new(pool);

    let summary = profiles.summary_of(UserId(404)).await.unwrap();
    assert_eq!(summary.gender, "Misteri");
    assert_eq!(summary.age, "??");
    assert_eq!(summary.bio, "-");

    profiles
        .upsert(
            UserId(5),
            ProfileFields {
                handle: None,
                gender: Some(Gender::Female),
                age: Some(22),
                bio: Some("coffee person".to_string()),
            },
        )
        .await
        .unwrap();

    let summary = profiles.summary_of(UserId(5)).await.unwrap();
    assert_eq!(summary.gender, "female");
    assert_eq!(summary.age, "22");
    assert_eq!(summary.bio, "coffee person");
}

#[tokio::test]
async fn pro_flag_round_trip() {
    let pool = connect(":memory:").await.expect("db");
    let profiles = ProfileStore::new(pool);

    profiles.set_pro(UserId(7), true).await.unwrap();
    let row = profiles.get_row(UserId(7)).await.unwrap().unwrap();
    assert!(row.is_pro);
    assert_eq!(profiles.count_pro().await.unwrap(), 1);

    profiles.set_pro(UserId(7), false).await.unwrap();
    assert_eq!(profiles.count_pro().await.unwrap(), 0);
}

#[tokio::test]
async fn reports_are_counted() {
    let pool = connect(":memory:").await.expect("db");
    let reports = ReportStore::new(pool);

    assert_eq!(reports.count().await.unwrap(), 0);
    reports.record(UserId(1), UserId(2)).await.unwrap();
    reports.record(UserId(3), UserId(2)).await.unwrap();
    assert_eq!(reports.count().await.unwrap(), 2);
}
