//! Fixtures shared by the integration tests.
//!
//! [`MockBackend`] is an in-process stand-in for the RoadSafe REST backend:
//! it records settlement calls, answers them according to a configurable
//! [`Reply`], and marks settled debts as paid in its debt listing.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use roadsafe_api::types::{DEBTS_PATH, DEBT_PAYMENT_PATH, FINE_PAYMENT_PATH};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the mock answers settlement calls.
#[derive(Debug, Clone)]
pub enum Reply {
    Ack,
    Reject(String),
    ServerError,
}

/// One settlement call as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSettlement {
    pub path: String,
    pub body: Value,
}

pub struct MockBackend {
    settlements: Mutex<Vec<RecordedSettlement>>,
    debts: Mutex<Vec<Value>>,
    reply: Mutex<Reply>,
    debt_reads: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Self::with_debts(Vec::new())
    }

    pub fn with_debts(debts: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            settlements: Mutex::new(Vec::new()),
            debts: Mutex::new(debts),
            reply: Mutex::new(Reply::Ack),
            debt_reads: AtomicUsize::new(0),
        })
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn settlements(&self) -> Vec<RecordedSettlement> {
        self.settlements.lock().unwrap().clone()
    }

    pub fn debt_reads(&self) -> usize {
        self.debt_reads.load(Ordering::SeqCst)
    }

    /// Serve on an ephemeral local port. Returns the base URL.
    pub async fn spawn(self: &Arc<Self>) -> String {
        let router = Router::new()
            .route(DEBT_PAYMENT_PATH, post(settle_debt))
            .route(FINE_PAYMENT_PATH, post(settle_fine))
            .route(DEBTS_PATH, get(list_debts))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn settle(&self, path: &str, body: Value) -> Response {
        let reply = self.reply.lock().unwrap().clone();
        tracing::debug!(path, %body, ?reply, "mock settlement");
        self.settlements.lock().unwrap().push(RecordedSettlement {
            path: path.to_string(),
            body: body.clone(),
        });

        match reply {
            Reply::Ack => {
                if let Some(id) = body.get("debtId").and_then(Value::as_str) {
                    let mut debts = self.debts.lock().unwrap();
                    for debt in debts.iter_mut().filter(|d| d["id"] == id) {
                        debt["status"] = json!("PAID");
                    }
                }
                Json(json!({"success": true, "message": "Payment processed"})).into_response()
            }
            Reply::Reject(message) => {
                Json(json!({"success": false, "message": message})).into_response()
            }
            Reply::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "database unavailable"})),
            )
                .into_response(),
        }
    }
}

async fn settle_debt(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    mock.settle(DEBT_PAYMENT_PATH, body)
}

async fn settle_fine(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    mock.settle(FINE_PAYMENT_PATH, body)
}

async fn list_debts(State(mock): State<Arc<MockBackend>>) -> Json<Value> {
    mock.debt_reads.fetch_add(1, Ordering::SeqCst);
    let debts = mock.debts.lock().unwrap().clone();
    Json(Value::Array(debts))
}

/// An unpaid debt as the backend lists it.
pub fn unpaid_debt(id: &str, principal: u64, due_date: &str) -> Value {
    json!({
        "id": id,
        "principal": principal,
        "dueDate": due_date,
        "createdAt": "2023-12-01T00:00:00Z",
        "status": "UNPAID"
    })
}
