//! End-to-end scoring batch over the in-memory store.

use std::sync::Arc;

use dossier::classify::RiskBand;
use dossier::dictionary::{SeverityDictionary, SeverityTier};
use dossier::pipeline::ScoringPipeline;
use dossier::store::{Document, Entity, EntityStore, MemoryEntityStore};

fn screening_dictionary() -> Arc<SeverityDictionary> {
    Arc::new(
        SeverityDictionary::new(vec![
            SeverityTier::new(1, 5, &["routine"]),
            SeverityTier::new(2, 10, &["transfer"]),
            SeverityTier::new(3, 25, &["inquiry"]),
            SeverityTier::new(4, 50, &["allegation"]),
            SeverityTier::new(5, 100, &["abuse", "victim"]),
        ])
        .unwrap(),
    )
}

#[tokio::test]
async fn test_full_batch_scores_and_classifies_entities() {
    let store = Arc::new(MemoryEntityStore::new());

    let jane = store.insert_entity(Entity::new("Jane Doe"));
    let doc = store.insert_document(Document::new(
        "field report",
        "Investigators uncovered ABUSE allegations near the victim. Jane Doe was interviewed.",
    ));
    store.link_mention(jane, doc);

    // Mentioned in a document with no indicator keywords at all.
    let clean = store.insert_entity(Entity::new("Pat Quiet"));
    let doc = store.insert_document(Document::new("itinerary", "Pat Quiet flew home."));
    store.link_mention(clean, doc);

    // No mention rows: outside the batch's scoring scope entirely.
    let absent = store.insert_entity(Entity::new("Nobody Known"));

    let pipeline = ScoringPipeline::new(store.clone(), screening_dictionary(), 4);
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.scored, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.classified, 3);

    let jane = store.entity(jane).unwrap();
    assert_eq!(jane.total_score, 250); // abuse 100 + allegation 50 + victim 100
    assert_eq!(jane.peak_tier, 5);
    assert_eq!(jane.risk_band, RiskBand::High);
    assert_eq!(jane.mention_count, 1);

    let clean = store.entity(clean).unwrap();
    assert_eq!(clean.total_score, 0);
    assert_eq!(clean.peak_tier, 0);
    assert_eq!(clean.risk_band, RiskBand::Low);

    let absent = store.entity(absent).unwrap();
    assert_eq!(absent.total_score, 0);
    assert_eq!(absent.risk_band, RiskBand::Low);
    assert!(absent.last_scored_at.is_none());
}

#[tokio::test]
async fn test_band_thresholds_applied_in_classification_pass() {
    // Tier weights tuned so totals land exactly on the band boundaries.
    // Keywords share no substrings, so each document hits exactly one.
    let dictionary = Arc::new(
        SeverityDictionary::new(vec![
            SeverityTier::new(1, 9, &["alpha"]),
            SeverityTier::new(2, 10, &["bravo"]),
            SeverityTier::new(3, 49, &["charlie"]),
            SeverityTier::new(4, 50, &["delta"]),
            SeverityTier::new(5, 100, &["echo"]),
        ])
        .unwrap(),
    );

    let store = Arc::new(MemoryEntityStore::new());
    let mut expectations = Vec::new();
    for (name, keyword, score, band) in [
        ("Person Able", "alpha", 9u32, RiskBand::Low),
        ("Person Baker", "bravo", 10, RiskBand::Medium),
        ("Person Cole", "charlie", 49, RiskBand::Medium),
        ("Person Dane", "delta", 50, RiskBand::High),
    ] {
        let id = store.insert_entity(Entity::new(name));
        let doc = store.insert_document(Document::new("note", format!("{name} {keyword}")));
        store.link_mention(id, doc);
        expectations.push((id, score, band));
    }

    ScoringPipeline::new(store.clone(), dictionary, 2)
        .run()
        .await
        .unwrap();

    for (id, score, band) in expectations {
        let entity = store.entity(id).unwrap();
        assert_eq!(entity.total_score, score);
        assert_eq!(entity.risk_band, band);
    }
}

#[tokio::test]
async fn test_rerunning_batch_is_idempotent() {
    let store = Arc::new(MemoryEntityStore::new());
    let jane = store.insert_entity(Entity::new("Jane Doe"));
    let doc = store.insert_document(Document::new(
        "deposition",
        "Jane Doe denied the allegation about the transfer",
    ));
    store.link_mention(jane, doc);

    let pipeline = ScoringPipeline::new(store.clone(), screening_dictionary(), 4);

    pipeline.run().await.unwrap();
    let first = store.entity(jane).unwrap();

    pipeline.run().await.unwrap();
    let second = store.entity(jane).unwrap();

    assert_eq!(first.total_score, second.total_score);
    assert_eq!(first.peak_tier, second.peak_tier);
    assert_eq!(first.mention_count, second.mention_count);
    assert_eq!(first.risk_band, second.risk_band);
}

#[tokio::test]
async fn test_absent_document_content_is_recovered_not_fatal() {
    let store = Arc::new(MemoryEntityStore::new());
    let jane = store.insert_entity(Entity::new("Jane Doe"));
    let empty = store.insert_document(Document::without_content("pending scan"));
    let real = store.insert_document(Document::new("memo", "Jane Doe paid the transfer"));
    store.link_mention(jane, empty);
    store.link_mention(jane, real);

    let report = ScoringPipeline::new(store.clone(), screening_dictionary(), 4)
        .run()
        .await
        .unwrap();
    assert_eq!(report.scored, 1);
    assert_eq!(report.skipped, 0);

    let jane = store.entity(jane).unwrap();
    assert_eq!(jane.total_score, 10);
    assert_eq!(jane.mention_count, 1);
}

#[tokio::test]
async fn test_large_batch_with_bounded_workers() {
    let store = Arc::new(MemoryEntityStore::new());
    let mut scored_ids = Vec::new();
    for i in 0..50 {
        let name = format!("Person {i:02}");
        let id = store.insert_entity(Entity::new(name.clone()));
        let doc = store.insert_document(Document::new(
            "bulk",
            format!("{name} was linked to an abuse inquiry"),
        ));
        store.link_mention(id, doc);
        scored_ids.push(id);
    }

    let report = ScoringPipeline::new(store.clone(), screening_dictionary(), 4)
        .run()
        .await
        .unwrap();
    assert_eq!(report.scored, 50);
    assert_eq!(report.classified, 50);

    for id in scored_ids {
        let entity = store.entity(id).unwrap();
        assert_eq!(entity.total_score, 125); // abuse 100 + inquiry 25
        assert_eq!(entity.risk_band, RiskBand::High);
    }
}
