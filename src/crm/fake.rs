//! Scripted in-memory CRM used by pipeline tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{CrmApi, CrmError, CrmParams};

/// One recorded remote call.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: String,
    pub params: CrmParams,
}

type Reply = Result<Value, CrmError>;

/// Replies are queued per method; a method with an empty queue answers
/// with its default reply, or `{"result": true}` if none is set.
#[derive(Debug, Default)]
pub(crate) struct FakeCrm {
    configured: bool,
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    defaults: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeCrm {
    pub fn new() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub async fn reply(&self, method: &str, reply: Reply) {
        self.queued
            .lock()
            .await
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub async fn always(&self, method: &str, result: Value) {
        self.defaults
            .lock()
            .await
            .insert(method.to_string(), result);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn calls_to(&self, method: &str) -> Vec<CrmParams> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.params.clone())
            .collect()
    }
}

#[async_trait]
impl CrmApi for FakeCrm {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn call(&self, method: &str, params: &CrmParams) -> Result<Value, CrmError> {
        if !self.configured {
            return Err(CrmError::NotConfigured);
        }
        self.calls.lock().await.push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
        });
        if let Some(reply) = self
            .queued
            .lock()
            .await
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }
        Ok(self
            .defaults
            .lock()
            .await
            .get(method)
            .cloned()
            .unwrap_or(Value::Bool(true)))
    }
}
