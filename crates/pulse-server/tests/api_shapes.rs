//! Response shape tests — the JSON field names external renderers read
//! from leads, reports and snapshots.

use std::sync::Arc;

use pulse_core::EngineConfig;
use pulse_ingest::{MessageEnvelope, StaticAliases};
use pulse_runtime::Engine;
use pulse_store::{JsonFileStore, MemorySnapshotStore, SnapshotStore};

const T0: i64 = 1_700_000_040_000;

fn seeded_engine(store: Arc<dyn SnapshotStore>) -> Engine {
    let engine = Engine::open(
        EngineConfig::default(),
        store,
        Arc::new(StaticAliases::default()),
        T0,
    );
    let messages = [
        ("u1", "quero comprar NIX 🚀🚀", T0 - 3_000),
        ("u2", "NIX na dex, cadê a liquidez?", T0 - 2_000),
        ("u1", "NIX NIX", T0 - 1_000),
    ];
    for (user, text, ts) in messages {
        let envelope = MessageEnvelope::text(user, &user.to_uppercase(), text);
        engine.ingest(&envelope, "g1", "Comunidade", ts);
    }
    engine
}

/// Lead entries as listed by `/api/leads` and inside reports.
#[test]
fn test_lead_view_shape() {
    let engine = seeded_engine(Arc::new(MemorySnapshotStore::new()));
    let leads = engine.top_lead_views(10, None, T0);
    let lead = serde_json::to_value(&leads[0]).unwrap();

    for field in [
        "userId",
        "groupId",
        "displayName",
        "groupName",
        "score",
        "messages",
        "tokenMentions",
        "hypeEmojis",
        "buyIntentHits",
        "speculationHits",
        "firstSeen",
        "lastActivity",
        "recentMessageTimestamps",
        "tier",
        "tierEmoji",
        "interest",
        "activity",
        "estimatedValue",
    ] {
        assert!(!lead[field].is_null(), "missing field {}", field);
    }
    assert!(lead["score"].is_number());
    assert!(lead["tier"].is_string());
    assert!(lead["recentMessageTimestamps"].is_array());
}

/// Report consumed by renderers.
#[test]
fn test_report_shape() {
    let engine = seeded_engine(Arc::new(MemorySnapshotStore::new()));
    let report = engine.build_report(Some("g1"), T0);
    let json = serde_json::to_value(report.as_ref()).unwrap();

    assert_eq!(json["scope"], "g1");
    assert_eq!(json["generatedAt"], T0);

    let summary = &json["summary"];
    assert_eq!(summary["totalMessages"], 3);
    assert_eq!(summary["activeUsers"], 2);
    assert!(summary["growthPct"].is_number());
    assert!(summary["messagesPerMinute"].is_number());

    assert!(json["leads"].is_array());
    let topic = &json["topTopics"][0];
    assert_eq!(topic["token"], "NIX");
    for field in [
        "totalMentions",
        "lastHourMentions",
        "previousHourMentions",
        "growthRate",
        "engagementScore",
        "tier",
    ] {
        assert!(!topic[field].is_null(), "missing topic field {}", field);
    }
    assert_eq!(json["hype"][0]["tier"], "strong_hype");

    let pulse = &json["pulse"];
    assert_eq!(pulse["temperature"], "cold");
    assert!(pulse["trend"]["trend"].is_string());
    assert!(pulse["trend"]["growthPct"].is_number());
    assert!(pulse["energy"]["percent"].is_number());
    assert!(pulse["energy"]["label"].is_string());
}

/// Snapshot file written by the JSON store.
#[test]
fn test_snapshot_file_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cie-state.json");
    let engine = seeded_engine(Arc::new(JsonFileStore::new(&path)));
    assert!(engine.save_now(T0));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    assert_eq!(raw["savedAt"], T0);
    assert_eq!(raw["leads"]["u1::g1"]["buyIntentHits"], 1);
    assert_eq!(raw["messages"].as_array().unwrap().len(), 3);
    assert_eq!(raw["messages"][0]["userId"], "u1");
}
