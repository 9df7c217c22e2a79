#![allow(dead_code)]

use jobboard_session::{
    api::{ApiResponse, Transport},
    config::join_api_path,
    errors::AppError,
    types::User,
};
use serde_json::Value;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};
use tokio::sync::oneshot;
use url::Url;

pub const API_BASE: &str = "http://localhost:5000/api/";

pub const USER_JSON: &str = r#"{"_id":"1","email":"a@b.com","name":"A","role":"job_seeker"}"#;
pub const LOGIN_JSON: &str =
    r#"{"user":{"id":"1","email":"a@b.com","name":"A","role":"job_seeker"}}"#;

pub type Outcome = Result<ApiResponse, AppError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Debug)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

enum Scripted {
    Ready(Outcome),
    Gated(oneshot::Receiver<Outcome>),
}

/// Replays scripted responses per method and path, in order. Unscripted
/// requests fail like an unreachable server.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Scripted::Ready(Ok(ApiResponse::new(status, body))));
        self
    }

    pub fn fail(self, method: Method, path: &str, err: AppError) -> Self {
        self.push(method, path, Scripted::Ready(Err(err)));
        self
    }

    /// Queues a response that is held until the returned sender fires.
    pub fn gate(&self, method: Method, path: &str) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, Scripted::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    async fn respond(&self, method: Method, path: &str, body: Option<Value>) -> Outcome {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body,
        });

        let next = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&(method, path.to_string()))
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(AppError::Network("gate dropped".to_string()))),
            None => Err(AppError::Network(format!("no scripted response for {path}"))),
        }
    }
}

impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, AppError> {
        self.respond(Method::Get, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<ApiResponse, AppError> {
        self.respond(Method::Post, path, body).await
    }

    fn resolve(&self, path: &str) -> Result<Url, AppError> {
        let base = Url::parse(API_BASE).map_err(|err| AppError::Config(err.to_string()))?;
        join_api_path(&base, path)
    }
}

pub fn user() -> User {
    serde_json::from_str(USER_JSON).unwrap()
}
