//! End-to-end conversation turns against a scripted model and in-memory tools.

mod common;

use common::*;
use conductor::{ConversationError, ConversationRequest, ConversationState, Message};
use llm::LlmError;
use serde_json::json;
use std::sync::atomic::Ordering;

fn request(messages: Vec<Message>) -> ConversationRequest {
    ConversationRequest::new(messages)
}

#[tokio::test]
async fn test_empty_messages_is_bad_request_without_upstream_calls() {
    let h = harness(vec![reply("deploy_contract")]);

    let err = h.orchestrator.handle(&request(Vec::new())).await.unwrap_err();

    assert!(matches!(err, ConversationError::BadRequest(_)));
    assert_eq!(h.provider.list_count(), 0);
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn test_first_utterance_detects_tool_and_asks_for_missing_parameter() {
    let h = harness(vec![
        reply("deploy_contract"),
        reply(r#"{"owner": "0x123"}"#),
        reply("How many tokens should I mint?"),
    ]);

    let out = h
        .orchestrator
        .handle(&request(vec![Message::user("Deploy a contract with owner 0x123")]))
        .await
        .unwrap();

    assert_eq!(out.content, "How many tokens should I mint?");
    let state = state_of(&out);
    assert_eq!(state.tool_name.as_deref(), Some("deploy_contract"));
    assert_eq!(serde_json::Value::Object(state.collected_inputs), json!({"owner": "0x123"}));
    assert!(!state.finished);
    assert!(!state.context_state_pending);

    // The prompt asks for the parameter by its description.
    let calls = h.model.calls.lock().unwrap();
    assert!(calls[2].0.contains("the amount of tokens to mint"));
}

#[tokio::test]
async fn test_all_parameters_in_first_utterance_reports_readiness() {
    let h = harness(vec![
        reply("deploy_contract"),
        reply(r#"{"owner": "0x123", "amount": 100}"#),
    ]);

    let out = h
        .orchestrator
        .handle(&request(vec![Message::user(
            "Deploy a contract with owner 0x123 and amount 100",
        )]))
        .await
        .unwrap();

    let state = state_of(&out);
    assert!(state.finished);
    assert_eq!(state.collected_inputs["amount"], json!(100));
    assert!(out.content.contains("run it"));
    assert_eq!(h.model.call_count(), 2);
    assert!(h.provider.invocations().is_empty());
}

#[tokio::test]
async fn test_follow_up_merges_with_collected_inputs() {
    let h = harness(vec![reply(r#"{"amount": "1,000"}"#)]);
    let prior = active_state("deploy_contract", json!({"owner": "0x123"}));

    let out = h
        .orchestrator
        .handle(&request(vec![
            Message::user("Deploy a contract with owner 0x123"),
            assistant_with_state("How many tokens?", &prior),
            Message::user("1,000 tokens"),
        ]))
        .await
        .unwrap();

    let state = state_of(&out);
    assert_eq!(state.collected_inputs["owner"], json!("0x123"));
    assert_eq!(state.collected_inputs["amount"], json!(1000));
    assert!(state.finished);
}

#[tokio::test]
async fn test_execution_keyword_runs_tool_and_resets_state() {
    let h = harness(Vec::new());
    let mut prior = active_state("deploy_contract", json!({"owner": "0x123", "amount": 100}));
    prior.finished = true;

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Ready.", &prior),
            Message::user("let's execute"),
        ]))
        .await
        .unwrap();

    let invocations = h.provider.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].0, "deploy_contract");
    assert_eq!(invocations[0].1["amount"], json!(100));

    assert!(out.content.contains("deploy_contract completed"));
    let state = state_of(&out);
    assert!(state.tool_name.is_none());
    assert!(state.collected_inputs.is_empty());
    assert!(!state.finished);
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn test_failed_execution_is_reported_and_resets() {
    let h = harness(Vec::new());
    *h.provider.failing_tool.lock().unwrap() = Some("deploy_contract".to_string());
    let prior = active_state("deploy_contract", json!({"owner": "0x123", "amount": 100}));

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Ready.", &prior),
            Message::user("run it"),
        ]))
        .await
        .unwrap();

    assert!(out.content.contains("execution reverted"));
    assert!(state_of(&out).is_empty());
}

#[tokio::test]
async fn test_reference_to_other_tool_proposes_switch() {
    let h = harness(Vec::new());
    let prior = active_state("deploy_contract", json!({"owner": "0x123"}));

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("How many tokens?", &prior),
            Message::user("I want to create a new repo"),
        ]))
        .await
        .unwrap();

    let state = state_of(&out);
    assert!(state.context_state_pending);
    assert_eq!(state.tool_pending.as_deref(), Some("create_repo"));
    assert_eq!(state.tool_name.as_deref(), Some("deploy_contract"));
    assert!(out.content.contains("yes/no"));
    assert_eq!(h.model.call_count(), 0);
}

fn pending_switch() -> ConversationState {
    let mut state = active_state("deploy_contract", json!({"owner": "0x123"}));
    state.context_state_pending = true;
    state.tool_pending = Some("create_repo".to_string());
    state
}

#[tokio::test]
async fn test_confirmed_switch_starts_new_tool() {
    let h = harness(Vec::new());

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Switch?", &pending_switch()),
            Message::user("yes"),
        ]))
        .await
        .unwrap();

    let state = state_of(&out);
    assert_eq!(state.tool_name.as_deref(), Some("create_repo"));
    assert!(state.collected_inputs.is_empty());
    assert!(!state.context_state_pending);
    assert!(state.tool_pending.is_none());
    assert!(out.content.contains("the repository name"));
}

#[tokio::test]
async fn test_declined_switch_resumes_original_tool() {
    let h = harness(Vec::new());

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Switch?", &pending_switch()),
            Message::user("no thanks"),
        ]))
        .await
        .unwrap();

    let state = state_of(&out);
    assert_eq!(state.tool_name.as_deref(), Some("deploy_contract"));
    assert_eq!(state.collected_inputs["owner"], json!("0x123"));
    assert!(!state.context_state_pending);
    assert!(out.content.contains("the amount of tokens to mint"));
}

#[tokio::test]
async fn test_colloquial_yes_switches() {
    let h = harness(Vec::new());

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Switch?", &pending_switch()),
            Message::user("yeah"),
        ]))
        .await
        .unwrap();

    assert_eq!(state_of(&out).tool_name.as_deref(), Some("create_repo"));
}

#[tokio::test]
async fn test_hesitant_answer_keeps_collected_inputs() {
    let h = harness(Vec::new());

    for reply in ["not sure", "nope"] {
        let out = h
            .orchestrator
            .handle(&request(vec![
                assistant_with_state("Switch?", &pending_switch()),
                Message::user(reply),
            ]))
            .await
            .unwrap();

        let state = state_of(&out);
        assert_eq!(state.tool_name.as_deref(), Some("deploy_contract"), "{reply}");
        assert_eq!(state.collected_inputs["owner"], json!("0x123"), "{reply}");
        assert!(!state.context_state_pending, "{reply}");
    }
}

#[tokio::test]
async fn test_unclear_answer_keeps_switch_pending() {
    let h = harness(Vec::new());

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Switch?", &pending_switch()),
            Message::user("hmm, what?"),
        ]))
        .await
        .unwrap();

    assert_eq!(state_of(&out), pending_switch());
}

#[tokio::test]
async fn test_unknown_intent_asks_for_clarification() {
    let h = harness(vec![reply("unknown")]);

    let out = h
        .orchestrator
        .handle(&request(vec![Message::user("what's the meaning of life?")]))
        .await
        .unwrap();

    assert!(out.content.contains("deploy_contract"));
    assert!(out.content.contains("create_repo"));
    let annotation = &out.annotations[0];
    assert_eq!(annotation["type"], "tool-input-state");
    assert!(state_of(&out).is_empty());
}

#[tokio::test]
async fn test_invented_tool_name_is_not_trusted() {
    let h = harness(vec![reply("launch_rocket")]);

    let out = h
        .orchestrator
        .handle(&request(vec![Message::user("launch the rocket")]))
        .await
        .unwrap();

    assert!(state_of(&out).is_empty());
    assert_eq!(h.model.call_count(), 1);
}

#[tokio::test]
async fn test_vanished_tool_resets_state() {
    let h = harness(Vec::new());
    let prior = active_state("mint_nft", json!({"to": "0xabc"}));

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Which image?", &prior),
            Message::user("the cat picture"),
        ]))
        .await
        .unwrap();

    assert!(out.content.contains("mint_nft"));
    assert!(state_of(&out).is_empty());
}

#[tokio::test]
async fn test_provider_unavailable_fails_request() {
    let h = harness(vec![reply("deploy_contract")]);
    h.provider.unavailable.store(true, Ordering::SeqCst);

    let err = h
        .orchestrator
        .handle(&request(vec![Message::user("Deploy a contract")]))
        .await
        .unwrap_err();

    assert!(matches!(err, ConversationError::ProviderUnavailable(_)));
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn test_unparsable_extraction_still_prompts() {
    let h = harness(vec![
        reply("deploy_contract"),
        reply("I could not find any values, sorry."),
        Step::Fail(LlmError::ServiceUnavailable("overloaded".to_string())),
    ]);

    let out = h
        .orchestrator
        .handle(&request(vec![Message::user("Deploy a contract")]))
        .await
        .unwrap();

    // Extraction yields nothing and the prompt falls back to a plain request.
    assert_eq!(out.content, "Please provide the owner address.");
    let state = state_of(&out);
    assert_eq!(state.tool_name.as_deref(), Some("deploy_contract"));
    assert!(state.collected_inputs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_model_timeout_is_distinguishable() {
    let h = harness(vec![Step::Stall]);

    let err = h
        .orchestrator
        .handle(&request(vec![Message::user("Deploy a contract")]))
        .await
        .unwrap_err();

    match err {
        ConversationError::Timeout { duration, .. } => assert_eq!(duration, MODEL_TIMEOUT),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_corrupt_pending_state_resets() {
    let h = harness(Vec::new());
    let mut prior = ConversationState::default();
    prior.context_state_pending = true;

    let out = h
        .orchestrator
        .handle(&request(vec![
            assistant_with_state("Switch?", &prior),
            Message::user("yes"),
        ]))
        .await
        .unwrap();

    assert!(state_of(&out).is_empty());
}

#[tokio::test]
async fn test_three_turn_conversation() {
    let h = harness(vec![
        reply("deploy_contract"),
        reply(r#"{"owner": "0x123"}"#),
        reply("What amount?"),
        reply(r#"{"amount": 100}"#),
    ]);

    let mut history = vec![Message::user("Deploy a contract with owner 0x123")];
    let first = h.orchestrator.handle(&request(history.clone())).await.unwrap();
    history.push(first);

    history.push(Message::user("100"));
    let second = h.orchestrator.handle(&request(history.clone())).await.unwrap();
    assert!(state_of(&second).finished);
    history.push(second);

    history.push(Message::user("go ahead"));
    let third = h.orchestrator.handle(&request(history)).await.unwrap();

    assert!(state_of(&third).is_empty());
    let invocations = h.provider.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        serde_json::Value::Object(invocations[0].1.clone()),
        json!({"owner": "0x123", "amount": 100})
    );
    assert_eq!(h.provider.list_count(), 3);
}
