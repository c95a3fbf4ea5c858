mod support;

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use rolematch_backend::matching::events::{ProgressEvent, ProgressSink};
use rolematch_backend::matching::tools::{FINALIZE_CANDIDATES, SKILL_TAGS};
use rolematch_backend::matching::MatchOrchestrator;
use rolematch_backend::services::audit_service::AuditService;

use support::{candidate_json, sample_role, tool_call, turn, InMemoryStore, ScriptedModel};

async fn run_streamed(
    model: Arc<ScriptedModel>,
    store: &InMemoryStore,
    dir: &std::path::Path,
) -> (
    rolematch_backend::error::Result<rolematch_backend::matching::MatchOutcome>,
    Vec<ProgressEvent>,
) {
    let orchestrator =
        MatchOrchestrator::new(model, Arc::new(store.clone()), AuditService::new(dir));
    let (sink, mut rx) = ProgressSink::channel();
    let result = orchestrator
        .run_match(sample_role(), &sink, &CancellationToken::new())
        .await;
    drop(sink);

    let mut events = Vec::new();
    while let Some(ev) = rx.recv().await {
        events.push(ev);
    }
    (result, events)
}

#[tokio::test]
async fn events_arrive_in_strict_chronological_order() {
    let tmp = tempfile::tempdir().unwrap();
    let finalize_args = json!({"results": [candidate_json("emp-001")], "roleId": 7});
    let model = ScriptedModel::new(vec![
        turn(None, vec![tool_call("call_1", SKILL_TAGS, "{}")]),
        turn(
            None,
            vec![tool_call(
                "call_2",
                FINALIZE_CANDIDATES,
                &finalize_args.to_string(),
            )],
        ),
    ]);
    let store = InMemoryStore::with_skill_tags(&[("emp-001", &["rust"])]);

    let (result, events) = run_streamed(model, &store, tmp.path()).await;
    result.unwrap();

    let shape: Vec<String> = events
        .iter()
        .map(|ev| match ev {
            ProgressEvent::Status { .. } => "status".to_string(),
            ProgressEvent::Tool { name, phase, .. } => format!("tool:{name}:{phase:?}"),
            ProgressEvent::Result { .. } => "result".to_string(),
            ProgressEvent::Error { .. } => "error".to_string(),
        })
        .collect();

    assert_eq!(
        shape,
        vec![
            "status".to_string(),
            format!("tool:{SKILL_TAGS}:Start"),
            format!("tool:{SKILL_TAGS}:Complete"),
            "status".to_string(),
            format!("tool:{FINALIZE_CANDIDATES}:Start"),
            format!("tool:{FINALIZE_CANDIDATES}:Progress"),
            format!("tool:{FINALIZE_CANDIDATES}:Complete"),
            "result".to_string(),
            "status".to_string(),
        ]
    );
}

#[tokio::test]
async fn the_terminal_result_event_carries_the_outcome_payload() {
    let tmp = tempfile::tempdir().unwrap();
    let finalize_args = json!({"results": [candidate_json("emp-001")], "roleId": 7});
    let model = ScriptedModel::new(vec![turn(
        None,
        vec![tool_call(
            "call_1",
            FINALIZE_CANDIDATES,
            &finalize_args.to_string(),
        )],
    )]);
    let store = InMemoryStore::new();

    let (result, events) = run_streamed(model, &store, tmp.path()).await;
    result.unwrap();

    let payload = events
        .iter()
        .find_map(|ev| match ev {
            ProgressEvent::Result { payload } => Some(payload.clone()),
            _ => None,
        })
        .expect("result event emitted");
    assert_eq!(payload["kind"], "finalized");
    assert_eq!(payload["success"], true);
    assert_eq!(payload["dataCount"], 1);
    assert_eq!(payload["failedCount"], 0);

    // The stream closes on a completing status, after the result.
    match events.last().expect("at least one event") {
        ProgressEvent::Status { message, progress } => {
            assert_eq!(message, "complete");
            let progress = progress.as_ref().expect("completion carries progress");
            assert_eq!(progress.current, progress.total);
            assert_eq!(progress.step, "complete");
        }
        other => panic!("expected completing status, got {other:?}"),
    }
}

#[tokio::test]
async fn a_model_failure_produces_no_result_event() {
    let tmp = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(vec![]);
    let store = InMemoryStore::new();

    let (result, events) = run_streamed(model, &store, tmp.path()).await;
    assert!(result.is_err());
    assert!(events
        .iter()
        .all(|ev| !matches!(ev, ProgressEvent::Result { .. })));
}

#[tokio::test]
async fn cancellation_mid_round_stops_before_the_next_tool() {
    let tmp = tempfile::tempdir().unwrap();
    let model = ScriptedModel::new(vec![turn(
        None,
        vec![tool_call("call_1", SKILL_TAGS, "{}")],
    )]);
    let store = InMemoryStore::new();
    let orchestrator = MatchOrchestrator::new(
        model.clone(),
        Arc::new(store.clone()),
        AuditService::new(tmp.path()),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = orchestrator
        .run_match(sample_role(), &ProgressSink::silent(), &cancel)
        .await;

    assert!(result.is_err());
    assert_eq!(model.calls(), 0);
    assert_eq!(store.state.lock().unwrap().read_calls, 0);
}
