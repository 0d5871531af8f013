//! End-to-end tests for the poll cycle over real HTTP.
//!
//! A fake homework API and a fake Telegram Bot API run as local axum
//! servers; the poller talks to them through the reqwest transport.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use homework_poller::{
    Cursor, CycleOutcome, FailureKind, PollCycle, ResponseFormatKind, ReviewStatus, Scheduler,
};
use homework_transport::{PracticumClient, TelegramNotifier};
use serde_json::{json, Value};

const PRACTICUM_TOKEN: &str = "y0_practicum";
const TELEGRAM_TOKEN: &str = "123:telegram";
const CHAT_ID: &str = "42";

/// Helper to find a port nothing listens on.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Serves `router` on an ephemeral port and returns its base URL.
async fn spawn_test_server(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    (format!("http://{addr}"), handle)
}

// ============================================================================
// Fake homework API
// ============================================================================

/// A request as seen by the fake homework API.
#[derive(Debug, Clone)]
struct SeenRequest {
    authorization: Option<String>,
    from_date: Option<String>,
}

#[derive(Clone)]
struct FakePracticum {
    reply: Arc<Mutex<(StatusCode, String)>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakePracticum {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            reply: Arc::new(Mutex::new((status, body.into()))),
            seen: Arc::default(),
        }
    }

    fn set_reply(&self, status: StatusCode, body: impl Into<String>) {
        *self.reply.lock().expect("lock") = (status, body.into());
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("lock").clone()
    }

    async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/api/user_api/homework_statuses/", get(homework_statuses))
            .with_state(self.clone());
        let (base, _handle) = spawn_test_server(router).await;
        format!("{base}/api/user_api/homework_statuses/")
    }
}

async fn homework_statuses(
    State(fake): State<FakePracticum>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    fake.seen.lock().expect("lock").push(SeenRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        from_date: query.get("from_date").cloned(),
    });
    fake.reply.lock().expect("lock").clone()
}

fn homeworks_body(name: &str, status: &str, current_date: i64) -> String {
    json!({
        "homeworks": [{"homework_name": name, "status": status}],
        "current_date": current_date,
    })
    .to_string()
}

// ============================================================================
// Fake Telegram Bot API
// ============================================================================

#[derive(Clone, Default)]
struct FakeTelegram {
    reject_with: Arc<Mutex<Option<String>>>,
    messages: Arc<Mutex<Vec<Value>>>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl FakeTelegram {
    fn rejecting(description: &str) -> Self {
        let fake = Self::default();
        *fake.reject_with.lock().expect("lock") = Some(description.to_string());
        fake
    }

    fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .expect("lock")
            .iter()
            .filter_map(|m| m["text"].as_str().map(str::to_string))
            .collect()
    }

    async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/:bot/sendMessage", post(send_message))
            .with_state(self.clone());
        let (base, _handle) = spawn_test_server(router).await;
        base
    }
}

async fn send_message(
    State(fake): State<FakeTelegram>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.paths.lock().expect("lock").push(bot);
    fake.messages.lock().expect("lock").push(body);

    match fake.reject_with.lock().expect("lock").clone() {
        Some(description) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": description})),
        ),
        None => (
            StatusCode::OK,
            Json(json!({"ok": true, "result": {"message_id": 1}})),
        ),
    }
}

// ============================================================================
// Wiring
// ============================================================================

fn poll_cycle(
    endpoint: &str,
    telegram_url: &str,
    cursor: Cursor,
) -> PollCycle<PracticumClient, TelegramNotifier> {
    let http = homework_transport::http_client().expect("Failed to build client");
    let api = PracticumClient::with_client(http.clone(), endpoint, PRACTICUM_TOKEN);
    let notifier = TelegramNotifier::with_client(http, telegram_url, TELEGRAM_TOKEN, CHAT_ID);
    PollCycle::new(api, notifier, cursor)
}

fn failure_kind(outcome: &CycleOutcome) -> Option<FailureKind> {
    match outcome {
        CycleOutcome::Failed { failure, .. } => Some(failure.kind()),
        _ => None,
    }
}

// ============================================================================
// Request shape
// ============================================================================

/// Tests that the API is queried with the OAuth token and the cursor.
#[tokio::test]
async fn test_fetch_sends_oauth_header_and_from_date() {
    let practicum = FakePracticum::new(StatusCode::OK, r#"{"homeworks": []}"#);
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(1_700_000_000));
    let outcome = cycle.run().await;

    assert_eq!(outcome, CycleOutcome::Unchanged);
    let seen = practicum.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].authorization.as_deref(),
        Some("OAuth y0_practicum")
    );
    assert_eq!(seen[0].from_date.as_deref(), Some("1700000000"));
    assert!(telegram.texts().is_empty());
}

/// Tests that the cursor stays put unless advancing is enabled.
#[tokio::test]
async fn test_cursor_follows_current_date_only_when_advancing() {
    let practicum =
        FakePracticum::new(StatusCode::OK, homeworks_body("hw.zip", "reviewing", 1_700_000_500));
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut fixed = poll_cycle(&endpoint, &telegram_url, Cursor::new(100));
    fixed.run().await;
    fixed.run().await;

    let mut advancing = poll_cycle(&endpoint, &telegram_url, Cursor::new(100).advancing(true));
    advancing.run().await;
    advancing.run().await;

    let dates: Vec<_> = practicum
        .seen()
        .into_iter()
        .map(|r| r.from_date.unwrap_or_default())
        .collect();
    assert_eq!(dates, ["100", "100", "100", "1700000500"]);
}

// ============================================================================
// Status changes
// ============================================================================

/// Tests that a status change reaches the chat exactly once.
#[tokio::test]
async fn test_status_change_is_delivered_once() {
    let practicum = FakePracticum::new(StatusCode::OK, homeworks_body("hw.zip", "approved", 1));
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));

    let expected =
        "Изменился статус проверки работы \"hw.zip\". Работа проверена: ревьюеру всё понравилось. Ура!";
    assert_eq!(
        cycle.run().await,
        CycleOutcome::Delivered(expected.to_string())
    );
    assert_eq!(cycle.run().await, CycleOutcome::Unchanged);

    assert_eq!(telegram.texts(), [expected]);
    let messages = telegram.messages.lock().expect("lock").clone();
    assert_eq!(messages[0]["chat_id"], CHAT_ID);
    assert_eq!(
        telegram.paths.lock().expect("lock").as_slice(),
        [format!("bot{TELEGRAM_TOKEN}")]
    );
}

/// Tests that each new status produces a new message.
#[tokio::test]
async fn test_successive_status_changes() {
    let practicum = FakePracticum::new(StatusCode::OK, homeworks_body("hw.zip", "reviewing", 1));
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));
    cycle.run().await;
    practicum.set_reply(StatusCode::OK, homeworks_body("hw.zip", "rejected", 2));
    cycle.run().await;
    cycle.run().await;

    assert_eq!(
        telegram.texts(),
        [
            "Изменился статус проверки работы \"hw.zip\". Работа взята на проверку ревьюером.",
            "Изменился статус проверки работы \"hw.zip\". Работа проверена: у ревьюера есть замечания.",
        ]
    );
    assert_eq!(cycle.tracker().last_status(), Some(ReviewStatus::Rejected));
}

// ============================================================================
// Failures
// ============================================================================

/// Tests that an authentication error envelope is reported once.
#[tokio::test]
async fn test_not_authenticated_is_reported_once() {
    let practicum = FakePracticum::new(
        StatusCode::UNAUTHORIZED,
        json!({
            "code": "not_authenticated",
            "message": "Учетные данные не были предоставлены.",
        })
        .to_string(),
    );
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));
    let first = cycle.run().await;
    let second = cycle.run().await;

    let kind = FailureKind::ResponseFormat(ResponseFormatKind::NotAuthenticated);
    assert_eq!(failure_kind(&first), Some(kind));
    assert!(matches!(first, CycleOutcome::Failed { reported: true, .. }));
    assert!(matches!(second, CycleOutcome::Failed { reported: false, .. }));
    assert_eq!(
        telegram.texts(),
        ["Сбой в работе программы: Ошибка следующая: Учетные данные не были предоставлены."]
    );
}

/// Tests that a non-JSON body is reported as a decode failure.
#[tokio::test]
async fn test_non_json_body_is_reported() {
    let practicum = FakePracticum::new(StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>");
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));
    let outcome = cycle.run().await;

    assert_eq!(failure_kind(&outcome), Some(FailureKind::Decode));
    let texts = telegram.texts();
    assert_eq!(texts.len(), 1);
    assert!(
        texts[0].starts_with("Формат ответа API не JSON"),
        "got {texts:?}"
    );
}

/// Tests that an unreachable endpoint is reported once over many cycles.
#[tokio::test]
async fn test_unreachable_endpoint_reported_once() {
    let telegram = FakeTelegram::default();
    let telegram_url = telegram.spawn().await;
    let endpoint = format!("http://127.0.0.1:{}/", find_available_port());

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));
    for _ in 0..3 {
        let outcome = cycle.run().await;
        assert_eq!(failure_kind(&outcome), Some(FailureKind::Network));
    }

    let texts = telegram.texts();
    assert_eq!(texts.len(), 1, "got {texts:?}");
    assert!(texts[0].starts_with("Сбой в работе программы: Эндпоинт API недоступен"));
    assert!(!texts[0].contains(PRACTICUM_TOKEN));
}

/// Tests that a rejected message is logged but neither relayed nor retried.
#[tokio::test]
async fn test_telegram_rejection_is_not_relayed() {
    let practicum = FakePracticum::new(StatusCode::OK, homeworks_body("hw.zip", "approved", 1));
    let telegram = FakeTelegram::rejecting("Bad Request: chat not found");
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let mut cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));
    let first = cycle.run().await;
    let second = cycle.run().await;

    match &first {
        CycleOutcome::Failed { failure, reported } => {
            assert_eq!(failure.kind(), FailureKind::Notify);
            assert!(!reported);
            assert!(failure.to_string().contains("chat not found"));
            assert!(!failure.to_string().contains(TELEGRAM_TOKEN));
        }
        other => panic!("Expected a notify failure, got: {other:?}"),
    }
    // The status was recorded before delivery was attempted.
    assert_eq!(second, CycleOutcome::Unchanged);
    assert_eq!(telegram.texts().len(), 1);
    assert_eq!(cycle.tracker().last_status(), Some(ReviewStatus::Approved));
}

// ============================================================================
// Scheduler
// ============================================================================

/// Tests the full loop against live servers until shutdown.
#[tokio::test]
async fn test_scheduler_polls_until_shutdown() {
    let practicum = FakePracticum::new(StatusCode::OK, homeworks_body("hw.zip", "reviewing", 1));
    let telegram = FakeTelegram::default();
    let endpoint = practicum.spawn().await;
    let telegram_url = telegram.spawn().await;

    let cycle = poll_cycle(&endpoint, &telegram_url, Cursor::new(0));
    let mut scheduler = Scheduler::new(cycle, Duration::from_millis(20));
    let cycles = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    assert!(cycles >= 2, "only {cycles} cycles ran");
    assert_eq!(practicum.seen().len() as u64, cycles);
    assert_eq!(telegram.texts().len(), 1);
}
