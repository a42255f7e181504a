//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use conductor::config::LlmSettings;
use conductor::{ConversationOrchestrator, ConversationState, Message, ModelClient};
use llm::{ChatModel, ChatRequest, ChatResponse, LlmError, MessageRole};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tooling::{Tool, ToolCatalog, ToolError, ToolOutput, ToolProvider, ToolSchema};

pub const MODEL_TIMEOUT: Duration = Duration::from_secs(5);

/// One scripted model turn.
pub enum Step {
    Reply(String),
    Fail(LlmError),
    Stall,
}

pub fn reply(text: &str) -> Step {
    Step::Reply(text.to_string())
}

/// Chat model answering from a script, recording each (system, user) pair.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> llm::Result<ChatResponse> {
        let text_of = |role: MessageRole| {
            request
                .messages
                .iter()
                .find(|m| m.role == role)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        };
        self.calls
            .lock()
            .unwrap()
            .push((text_of(MessageRole::System), text_of(MessageRole::User)));

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(ChatResponse::text(text)),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Stall) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ChatResponse::text("too late"))
            }
            None => Err(LlmError::InvalidResponse("script exhausted".to_string())),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Tool provider holding tools in memory and recording invocations.
pub struct InMemoryProvider {
    tools: Vec<Tool>,
    pub unavailable: AtomicBool,
    pub list_calls: AtomicUsize,
    pub invocations: Mutex<Vec<(String, Map<String, Value>)>>,
    pub failing_tool: Mutex<Option<String>>,
}

impl InMemoryProvider {
    pub fn new(tools: Vec<Tool>) -> Arc<Self> {
        Arc::new(Self {
            tools,
            unavailable: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
            failing_tool: Mutex::new(None),
        })
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<(String, Map<String, Value>)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolProvider for InMemoryProvider {
    async fn list_tools(&self) -> tooling::Result<Vec<Tool>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ToolError::ProviderUnavailable("connection refused".to_string()));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> tooling::Result<ToolOutput> {
        self.invocations
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        if self.failing_tool.lock().unwrap().as_deref() == Some(name) {
            return Err(ToolError::execution(name, "execution reverted"));
        }
        Ok(ToolOutput::json(json!({"tool": name, "arguments": arguments})))
    }

    fn provider_name(&self) -> &str {
        "in-memory"
    }
}

pub fn deploy_contract() -> Tool {
    Tool::new(
        "deploy_contract",
        Some("deploys a smart contract"),
        ToolSchema::from(json!({
            "type": "object",
            "properties": {
                "owner": {"type": "string", "description": "the owner address"},
                "amount": {"type": "number", "description": "the amount of tokens to mint"}
            },
            "required": ["owner", "amount"]
        })),
    )
}

pub fn create_repo() -> Tool {
    Tool::new(
        "create_repo",
        Some("creates a new repository"),
        ToolSchema::from(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "the repository name"},
                "private": {"type": "boolean"}
            },
            "required": ["name"]
        })),
    )
}

pub fn catalog_tools() -> Vec<Tool> {
    vec![deploy_contract(), create_repo()]
}

pub struct Harness {
    pub orchestrator: ConversationOrchestrator,
    pub model: Arc<ScriptedModel>,
    pub provider: Arc<InMemoryProvider>,
}

pub fn harness(steps: Vec<Step>) -> Harness {
    harness_with_tools(steps, catalog_tools())
}

pub fn harness_with_tools(steps: Vec<Step>, tools: Vec<Tool>) -> Harness {
    let model = ScriptedModel::new(steps);
    let provider = InMemoryProvider::new(tools);
    let catalog = ToolCatalog::new(provider.clone())
        .with_list_timeout(Duration::from_secs(5))
        .with_invoke_timeout(Duration::from_secs(5));
    let orchestrator = ConversationOrchestrator::new(
        catalog,
        ModelClient::new(model.clone(), MODEL_TIMEOUT),
        &LlmSettings::default(),
    );
    Harness {
        orchestrator,
        model,
        provider,
    }
}

/// An assistant message carrying `state`, as a client would send it back.
pub fn assistant_with_state(content: &str, state: &ConversationState) -> Message {
    Message::assistant(content).with_annotation(state.to_annotation())
}

/// State carried by a reply.
pub fn state_of(message: &Message) -> ConversationState {
    ConversationState::recover(std::slice::from_ref(message))
}

pub fn active_state(tool: &str, inputs: Value) -> ConversationState {
    let mut state = ConversationState::for_tool(tool);
    if let Value::Object(map) = inputs {
        state.collected_inputs = map;
    }
    state
}
