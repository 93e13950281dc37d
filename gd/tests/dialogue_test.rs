//! End-to-end conversations through the Guardian router

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tempfile::TempDir;

use guardian::clock::FixedClock;
use guardian::dialogue::{APOLOGY, ConversationState, Flow, Guardian, GuardianSettings, Request, Response, UiAction};
use guardian::domain::{RecordKind, SealedRecord, UNDEFINED_DURATION};
use guardian::llm::{ChatClient, LlmError};
use guardian::store::{ContractRepository, MemoryRepository, RecordStore};

/// Replies with a fixed line and counts calls
struct CannedClient {
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

impl CannedClient {
    fn replying(reply: &'static str) -> Self {
        Self {
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatClient for CannedClient {
    async fn generate_reply(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => Err(LlmError::Unavailable("no collaborator".to_string())),
        }
    }
}

fn evening() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(18, 0, 0).unwrap()
}

fn guardian_with(repository: Arc<dyn ContractRepository>, chat: Arc<dyn ChatClient>) -> Guardian {
    Guardian::new(
        repository,
        chat,
        Arc::new(FixedClock::new(evening())),
        StdRng::seed_from_u64(2026),
        GuardianSettings {
            user_name: "Juan".to_string(),
            chat_timeout: Duration::from_millis(200),
        },
    )
}

fn offline_guardian() -> (Guardian, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::new());
    let guardian = guardian_with(repository.clone(), Arc::new(CannedClient::failing()));
    (guardian, repository)
}

/// Send each command in turn, threading the state through
async fn converse(guardian: &Guardian, state: ConversationState, commands: &[&str]) -> (ConversationState, Response) {
    let mut state = state;
    let mut last = None;
    for command in commands {
        let response = guardian.handle(Request::new(*command, &state)).await;
        state = response.nuevo_estado.clone();
        last = Some(response);
    }
    (state, last.expect("at least one command"))
}

#[tokio::test]
async fn test_contract_sealed_and_retrieved_from_file_store() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::spawn(dir.path()).unwrap();
    let guardian = guardian_with(Arc::new(store.clone()), Arc::new(CannedClient::failing()));

    let (state, response) = converse(
        &guardian,
        ConversationState::default(),
        &["forge a contract", "Study", "no", "20:00", "no", "confirm"],
    )
    .await;

    let records = store.list(Some(RecordKind::Contract)).await.unwrap();
    assert_eq!(records.len(), 1);
    let SealedRecord::Contract(contract) = &records[0] else {
        panic!("expected a contract");
    };
    assert_eq!(contract.mission, "Study");
    assert_eq!(contract.kickoff, "20:00");
    assert_eq!(contract.duration, UNDEFINED_DURATION);
    assert!(!contract.id.is_empty());
    assert!(response.message().contains(&contract.id));
    assert!(response.message().ends_with("Forge another contract? (yes/no)"));

    let (state, response) = converse(&guardian, state, &["no"]).await;
    assert!(state.flow.is_idle());
    assert!(response.message().contains("Back to chat mode"));

    let (_, response) = converse(&guardian, state, &[contract.id.as_str()]).await;
    assert_eq!(response.message(), records[0].render());

    store.shutdown().await.unwrap();
    let reopened = RecordStore::spawn(dir.path()).unwrap();
    assert_eq!(reopened.get(&contract.id).await.unwrap().as_ref(), Some(&records[0]));
}

#[tokio::test]
async fn test_transition_plan_sealed() {
    let (guardian, repository) = offline_guardian();

    let (state, response) = converse(
        &guardian,
        ConversationState::default(),
        &["plan the gap", "Dinner", "20:00"],
    )
    .await;
    assert!(response.message().contains("120 min until Dinner"));
    let Flow::NegotiatingTransition(session) = &state.flow else {
        panic!("expected transition mode");
    };
    let usable = session.draft.usable_minutes;
    assert!((100..=110).contains(&usable));

    let (state, response) = converse(&guardian, state, &["Read, Stretch (15 min)"]).await;
    assert!(response.message().contains("TRANSITION DRAFT"));

    let (state, response) = converse(&guardian, state, &["confirm"]).await;
    assert!(state.flow.is_idle());
    assert!(response.message().ends_with("Plan sealed. Back to chat mode."));

    let records = repository.list(Some(RecordKind::Transition)).await.unwrap();
    assert_eq!(records.len(), 1);
    let SealedRecord::Transition(plan) = &records[0] else {
        panic!("expected a transition plan");
    };
    assert!(plan.id.starts_with("BCH-"));
    assert_eq!(plan.mother_activity, "Dinner");
    assert_eq!(plan.usable_minutes, usable);
    assert!(plan.planned_minutes <= usable);
    assert_eq!(
        plan.unassigned_minutes,
        plan.usable_minutes as i64 - plan.planned_minutes as i64 - plan.rest_minutes as i64
    );
}

#[tokio::test]
async fn test_transition_gap_too_short() {
    let (guardian, repository) = offline_guardian();
    let (state, response) = converse(
        &guardian,
        ConversationState::default(),
        &["activate transition", "Call", "18:15"],
    )
    .await;
    assert!(state.flow.is_idle());
    assert!(response.message().contains("too tight"));
    assert_eq!(repository.len().await, 0);
}

#[tokio::test]
async fn test_combo_forges_one_contract_per_task() {
    let (guardian, repository) = offline_guardian();
    let (state, _) = converse(&guardian, ConversationState::default(), &["combo", "Read, Write"]).await;

    let mut state = state;
    let mut last = None;
    for _ in 0..2 {
        let (next, response) = converse(&guardian, state, &["no", "20:00", "no", "confirm"]).await;
        state = next;
        last = Some(response);
    }
    assert!(state.flow.is_idle());
    assert!(last.unwrap().message().contains("Combo complete"));

    let contracts = repository.list(Some(RecordKind::Contract)).await.unwrap();
    let mut missions: Vec<_> = contracts
        .iter()
        .map(|r| match r {
            SealedRecord::Contract(c) => c.mission.clone(),
            _ => String::new(),
        })
        .collect();
    missions.sort();
    assert_eq!(missions, vec!["Read", "Write"]);
}

#[tokio::test]
async fn test_roulette_suspends_until_a_listed_option_comes_back() {
    let (guardian, _) = offline_guardian();
    let (state, response) = converse(
        &guardian,
        ConversationState::default(),
        &["forge a contract", "Study, Exercise"],
    )
    .await;
    assert_eq!(response.accion_ui, Some(UiAction::ShowRoulette));
    assert_eq!(
        response.opciones_ruleta,
        Some(vec!["Study".to_string(), "Exercise".to_string()])
    );

    // an unlisted answer re-emits the same roulette
    let (state, response) = converse(&guardian, state, &["Sleep"]).await;
    assert_eq!(response.accion_ui, Some(UiAction::ShowRoulette));

    let (_, response) = converse(&guardian, state, &["Exercise"]).await;
    assert!(response.accion_ui.is_none());
    assert!(response.message().contains("Exercise"));
}

#[tokio::test]
async fn test_cancel_returns_to_chat() {
    let (guardian, _) = offline_guardian();
    let (state, response) = converse(
        &guardian,
        ConversationState::default(),
        &["ticket", "Games", "cancelar"],
    )
    .await;
    assert!(state.flow.is_idle());
    assert_eq!(response.message(), "Cancelled. Back to chat mode.");
}

#[tokio::test]
async fn test_chat_failure_keeps_history_clean() {
    let repository = Arc::new(MemoryRepository::new());
    let chat = Arc::new(CannedClient::failing());
    let guardian = guardian_with(repository, chat.clone());

    let (state, response) = converse(&guardian, ConversationState::default(), &["how are you?"]).await;
    assert_eq!(response.message(), APOLOGY);
    assert!(state.history.is_empty());
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_history_is_bounded() {
    let repository = Arc::new(MemoryRepository::new());
    let guardian = guardian_with(repository, Arc::new(CannedClient::replying("Noted.")));

    let commands: Vec<String> = (0..8).map(|i| format!("thought number {}", i)).collect();
    let commands: Vec<&str> = commands.iter().map(String::as_str).collect();
    let (state, response) = converse(&guardian, ConversationState::default(), &commands).await;
    assert_eq!(response.message(), "Noted.");
    assert_eq!(state.history.len(), 10);
    assert_eq!(state.history[0].content, "thought number 3");
}

#[tokio::test]
async fn test_legacy_state_decodes_as_idle() {
    let repository = Arc::new(MemoryRepository::new());
    let guardian = guardian_with(repository, Arc::new(CannedClient::replying("Hello again.")));

    let request = Request {
        comando: "hi".to_string(),
        estado_conversacion: json!({"modo": "libre", "historial": []}),
    };
    let response = guardian.handle(request).await;
    assert_eq!(response.message(), "Hello again.");
    assert!(response.nuevo_estado.flow.is_idle());

    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire["nuevo_estado"]["mode"], "idle");
    assert!(wire.get("accion_ui").is_none());
}

#[tokio::test]
async fn test_empty_state_is_accepted() {
    let (guardian, _) = offline_guardian();
    for state in [json!({}), serde_json::Value::Null] {
        let request = Request {
            comando: "_SALUDO_INICIAL_".to_string(),
            estado_conversacion: state,
        };
        let response = guardian.handle(request).await;
        assert_eq!(
            response.message(),
            "Hello. Welcome, Juan. How can I help you this afternoon?"
        );
    }
}
