#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use datahub_core::error::{DatahubError, Result};
use datahub_core::http::{ApiRequest, HttpTransport};
use serde_json::{Value, json};
use tokio::sync::oneshot;

enum Reply {
    Ready(Result<Value>),
    Deferred(oneshot::Receiver<Result<Value>>),
}

/// Transport fake that records every request and answers from a queue.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, body: Value) {
        self.replies.lock().unwrap().push_back(Reply::Ready(Ok(body)));
    }

    pub fn push_err(&self, err: DatahubError) {
        self.replies.lock().unwrap().push_back(Reply::Ready(Err(err)));
    }

    /// Queues a reply that resolves only when the returned sender fires.
    pub fn push_deferred(&self) -> oneshot::Sender<Result<Value>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Yields until `n` requests have been issued.
    pub async fn wait_for_requests(&self, n: usize) {
        while self.request_count() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(DatahubError::internal("deferred reply dropped"))),
            None => Err(DatahubError::internal("no scripted reply")),
        }
    }
}

pub fn dataset_json(id: &str, organization: Option<&str>, resource_count: usize) -> Value {
    let resources: Vec<Value> = (0..resource_count)
        .map(|i| json!({"id": i as i64, "name": format!("{}-{}", id, i), "format": "CSV"}))
        .collect();

    json!({
        "ckan_id": id,
        "name": id,
        "title": format!("Dataset {}", id),
        "organization_title": organization,
        "private": false,
        "tags": ["open"],
        "groups": null,
        "resources": resources,
    })
}

pub fn datasets_json(ids: &[&str]) -> Vec<Value> {
    ids.iter().map(|id| dataset_json(id, Some("Org"), 1)).collect()
}
