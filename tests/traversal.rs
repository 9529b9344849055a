// tests/traversal.rs
//! Folder × sortType × page walk against a scripted gateway.

mod common;

use common::{
    fetch_all_plan, page, page_with_total, sentence, sentences, word, FakeGateway, MemorySink,
};
use moji_export::{
    AppError, ExportRecord, Folder, FolderId, StopReason, TargetTypeSet, Traversal,
    TraversalPlan, TraversalReport,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn folder(id: &str, title: &str) -> Folder {
    Folder::new(FolderId::parse(id).unwrap(), title)
}

async fn run(
    gateway: &FakeGateway,
    plan: TraversalPlan,
    folders: &[Folder],
) -> (TraversalReport, MemorySink) {
    let mut sink = MemorySink::default();
    let report = Traversal::new(gateway, plan)
        .run(folders, &mut sink)
        .await
        .expect("traversal should succeed");
    (report, sink)
}

fn fetched_pairs(gateway: &FakeGateway) -> Vec<(String, i64, u64)> {
    gateway
        .page_fetches()
        .iter()
        .map(|p| {
            (
                p["fid"].as_str().unwrap().to_string(),
                p["sortType"].as_i64().unwrap(),
                p["pageIndex"].as_u64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_full_page_of_sentences_yields_every_record() {
    let gateway =
        FakeGateway::new().with_pages("f1", 0, vec![page_with_total(sentences(0, 20), 1)]);

    let (report, sink) = run(
        &gateway,
        fetch_all_plan(TargetTypeSet::sentences()),
        &[folder("f1", "例文")],
    )
    .await;

    assert_eq!(report.accepted, 20);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.pairs[0].reason, StopReason::TotalPagesReached);
    assert_eq!(sink.records.len(), 20);
    assert!(sink.finished);
    let last = sink.checkpoints.last().unwrap();
    assert_eq!(last.printed_total, 20);
    assert_eq!(last.position.page_index, 1);
    assert!(!last.stopped);
}

#[tokio::test]
async fn test_repeated_pages_stop_after_no_new_streak() {
    let repeated = page(sentences(0, 3));
    let gateway = FakeGateway::new().with_pages("f1", 0, vec![repeated; 10]);
    let mut plan = fetch_all_plan(TargetTypeSet::sentences());
    plan.stop_after_no_new = 2;

    let (report, sink) = run(&gateway, plan, &[folder("f1", "例文")]).await;

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.pairs[0].reason, StopReason::NoNewStreak);
    assert_eq!(sink.identities(), vec!["103:s0", "103:s1", "103:s2"]);
}

#[tokio::test]
async fn test_filtered_out_new_items_still_reset_the_streak() {
    let mixed = page(vec![word("w1", "猫"), sentence("s1", None, "猫がいる")]);
    let gateway = FakeGateway::new().with_pages(
        "f1",
        0,
        vec![page(vec![word("w1", "猫")]), mixed.clone(), mixed.clone(), mixed],
    );
    let mut plan = fetch_all_plan(TargetTypeSet::words());
    plan.stop_after_no_new = 2;

    let (report, sink) = run(&gateway, plan, &[folder("f1", "単語")]).await;

    // Page 2 brings only a sentence, which is filtered out but still new.
    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.pairs[0].reason, StopReason::NoNewStreak);
    assert_eq!(sink.identities(), vec!["102:w1"]);
}

#[tokio::test]
async fn test_items_are_unique_across_folders_and_sort_types() {
    let gateway = FakeGateway::new()
        .with_pages("f1", 0, vec![page(sentences(1, 2))])
        .with_pages("f1", 1, vec![page(sentences(2, 2))])
        .with_pages("f2", 0, vec![page(vec![sentence("s1", None, "文1"), sentence("s4", None, "文4")])]);
    let mut plan = fetch_all_plan(TargetTypeSet::sentences());
    plan.sort_types = vec![0, 1];

    let (report, sink) = run(&gateway, plan, &[folder("f1", "A"), folder("f2", "B")]).await;

    assert_eq!(sink.identities(), vec!["103:s1", "103:s2", "103:s3", "103:s4"]);
    assert_eq!(report.pairs_visited(), 4);
    assert!(report.pairs.iter().all(|p| p.reason == StopReason::Exhausted));

    // Sort types are iterated inside each folder.
    let order: Vec<(String, i64)> = fetched_pairs(&gateway)
        .into_iter()
        .filter(|(_, _, page)| *page == 1)
        .map(|(fid, sort, _)| (fid, sort))
        .collect();
    assert_eq!(
        order,
        vec![
            ("f1".to_string(), 0),
            ("f1".to_string(), 1),
            ("f2".to_string(), 0),
            ("f2".to_string(), 1),
        ]
    );

    // A record keeps the folder it was first seen in.
    match &sink.records[0].1 {
        ExportRecord::Sentence(record) => {
            assert_eq!(record.folder.id.as_str(), "f1");
            assert_eq!(record.sort_type, 0);
        }
        other => panic!("Expected sentence, got {:?}", other),
    }
}

fn mixed_page() -> serde_json::Value {
    page(vec![
        word("w1", "猫"),
        sentence("s1", None, "猫がいる"),
        json!({"targetType": 120, "target": {"objectId": "v1", "title": "ねこ", "excerpt": "cat"}}),
        json!({"targetType": 999, "target": {"objectId": "x1", "title": "other"}}),
    ])
}

#[tokio::test]
async fn test_words_mode_emits_only_words() {
    let gateway = FakeGateway::new().with_pages("f1", 0, vec![mixed_page()]);

    let (_, sink) = run(&gateway, fetch_all_plan(TargetTypeSet::words()), &[folder("f1", "x")]).await;

    assert_eq!(sink.identities(), vec!["102:w1"]);
    assert!(matches!(sink.records[0].1, ExportRecord::Word(_)));
}

#[tokio::test]
async fn test_sentences_mode_emits_only_sentence_like_items() {
    let gateway = FakeGateway::new().with_pages("f1", 0, vec![mixed_page()]);

    let (_, sink) = run(
        &gateway,
        fetch_all_plan(TargetTypeSet::sentences()),
        &[folder("f1", "x")],
    )
    .await;

    assert_eq!(sink.identities(), vec!["103:s1", "120:v1"]);
    match &sink.records[1].1 {
        ExportRecord::Sentence(record) => {
            assert_eq!(record.jp, "ねこ");
            assert_eq!(record.trans, "cat");
        }
        other => panic!("Expected sentence, got {:?}", other),
    }
}

#[tokio::test]
async fn test_expected_count_stops_mid_page_without_further_calls() {
    let gateway = FakeGateway::new()
        .with_pages("f1", 0, vec![page(sentences(0, 5)), page(sentences(5, 5))])
        .with_pages("f2", 0, vec![page(sentences(10, 5))]);
    let mut plan = fetch_all_plan(TargetTypeSet::sentences());
    plan.expected = 3;

    let (report, sink) = run(&gateway, plan, &[folder("f1", "A"), folder("f2", "B")]).await;

    assert_eq!(report.accepted, 3);
    assert!(report.stopped_early);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].reason, StopReason::ExpectedReached);
    assert_eq!(gateway.calls().len(), 1);

    let last = sink.checkpoints.last().unwrap();
    assert!(last.stopped);
    assert_eq!(last.printed_total, 3);
}

#[tokio::test]
async fn test_word_details_are_fetched_once_per_id() {
    let gateway = FakeGateway::new()
        .with_word("w1", "猫", "ねこ")
        .with_pages(
            "f1",
            0,
            vec![page(vec![
                sentence("s1", Some("w1"), "猫だ"),
                sentence("s2", Some("w1"), "猫がいる"),
                sentence("s3", Some("missing"), "犬だ"),
                sentence("s4", Some("missing"), "犬がいる"),
            ])],
        );

    let (report, sink) = run(
        &gateway,
        fetch_all_plan(TargetTypeSet::sentences()),
        &[folder("f1", "例文")],
    )
    .await;

    assert_eq!(gateway.word_lookups(), vec!["w1", "missing"]);
    assert_eq!(report.word_lookups, 2);
    assert_eq!(sink.records.len(), 4);
    match (&sink.records[1].1, &sink.records[3].1) {
        (ExportRecord::Sentence(found), ExportRecord::Sentence(failed)) => {
            assert_eq!(found.word.spell, "猫");
            assert_eq!(found.word.pron, "ねこ");
            assert_eq!(failed.word_id, "missing");
            assert_eq!(failed.word.spell, "");
        }
        other => panic!("Expected two sentences, got {:?}", other),
    }
}

#[tokio::test]
async fn test_page_cap_counts_from_start_page() {
    let pages = (0..6).map(|i| page(sentences(i * 10, 2))).collect();
    let gateway = FakeGateway::new().with_pages("f1", 0, pages);
    let mut plan = fetch_all_plan(TargetTypeSet::sentences());
    plan.start_page = 3;
    plan.max_pages = 2;

    let (report, _) = run(&gateway, plan, &[folder("f1", "例文")]).await;

    assert_eq!(report.pairs[0].reason, StopReason::PageCap);
    let indices: Vec<u64> = fetched_pairs(&gateway).into_iter().map(|(_, _, p)| p).collect();
    assert_eq!(indices, vec![3, 4]);
}

#[tokio::test]
async fn test_first_reported_total_pages_is_kept() {
    let gateway = FakeGateway::new().with_pages(
        "f1",
        0,
        vec![
            page_with_total(sentences(0, 2), 2),
            page_with_total(sentences(2, 2), 5),
            page_with_total(sentences(4, 2), 5),
        ],
    );

    let (report, sink) = run(
        &gateway,
        fetch_all_plan(TargetTypeSet::sentences()),
        &[folder("f1", "例文")],
    )
    .await;

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pairs[0].reason, StopReason::TotalPagesReached);
    assert_eq!(sink.records.len(), 4);
}

#[tokio::test]
async fn test_single_page_mode_stops_at_limit() {
    let gateway = FakeGateway::new()
        .with_pages("f1", 5, vec![page(sentences(0, 5))])
        .with_pages("f2", 5, vec![page(sentences(10, 5))]);
    let mut plan = fetch_all_plan(TargetTypeSet::sentences());
    plan.fetch_all = false;
    plan.limit = 2;
    plan.sort_types = vec![5, 0];
    plan.expected = 1;

    let (report, sink) = run(&gateway, plan, &[folder("f1", "A"), folder("f2", "B")]).await;

    // `expected` only applies to --all runs.
    assert_eq!(sink.identities(), vec!["103:s0", "103:s1"]);
    assert!(!report.stopped_early);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].reason, StopReason::PreviewComplete);
    assert_eq!(fetched_pairs(&gateway), vec![("f1".to_string(), 5, 1)]);
}

#[tokio::test]
async fn test_empty_run_still_checkpoints_pair_end_and_run_end() {
    let gateway = FakeGateway::new();

    let (report, sink) = run(
        &gateway,
        fetch_all_plan(TargetTypeSet::sentences()),
        &[folder("f1", "例文")],
    )
    .await;

    assert_eq!(report.accepted, 0);
    assert_eq!(report.pairs[0].reason, StopReason::Exhausted);
    assert_eq!(sink.checkpoints.len(), 2);
    let last = sink.checkpoints.last().unwrap();
    assert_eq!(last.printed_total, 0);
    assert_eq!(last.position.folder_id, "f1");
    assert_eq!(last.position.page_index, 1);
    assert!(sink.finished);
}

#[tokio::test]
async fn test_page_request_carries_type_hint() {
    let gateway = FakeGateway::new();
    let mut plan = fetch_all_plan(TargetTypeSet::both());
    plan.page_size = 50;

    run(&gateway, plan, &[folder("f1", "例文")]).await;

    let params = &gateway.page_fetches()[0];
    assert_eq!(params["fid"], json!("f1"));
    assert_eq!(params["sortType"], json!(0));
    assert_eq!(params["pageIndex"], json!(1));
    assert_eq!(params["count"], json!(50));
    assert_eq!(params["targetTypes"], json!([102, 103, 120]));
}

#[tokio::test]
async fn test_failed_page_aborts_with_envelope() {
    let gateway = FakeGateway::new().with_pages(
        "f1",
        0,
        vec![
            page(sentences(0, 2)),
            json!({"result": {"code": 500, "message": "boom"}}),
        ],
    );
    let mut sink = MemorySink::default();

    let err = Traversal::new(&gateway, fetch_all_plan(TargetTypeSet::sentences()))
        .run(&[folder("f1", "例文")], &mut sink)
        .await
        .unwrap_err();

    match err {
        AppError::Application {
            operation,
            code,
            envelope,
        } => {
            assert_eq!(operation, "folder-fetchContentWithRelatives");
            assert_eq!(code, 500);
            assert_eq!(envelope["message"], json!("boom"));
        }
        other => panic!("Expected Application error, got {:?}", other),
    }
    // Work done before the failure was already checkpointed.
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.checkpoints.len(), 1);
}
