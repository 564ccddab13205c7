use super::queue_access::QueueAccess;
use crate::application::ports::{RemoteError, RemoteStore};
use crate::domain::entities::MutationRecord;
use crate::domain::value_objects::{MutationAction, MutationId, MutationPayload, RowId};
use crate::infrastructure::offline::KeyValueQueueStore;
use crate::infrastructure::storage::InMemoryKeyValueStore;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const QUEUE_KEY: &str = "hytani_offline_queue";

pub fn memory_queue() -> (Arc<QueueAccess>, Arc<InMemoryKeyValueStore>) {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let store = Arc::new(KeyValueQueueStore::new(kv.clone(), QUEUE_KEY));
    (Arc::new(QueueAccess::new(store)), kv)
}

pub fn record(id: i64, action: MutationAction, payload: Value) -> MutationRecord {
    MutationRecord::new(
        MutationId::new(id).unwrap(),
        action,
        MutationPayload::new(payload).unwrap(),
        Utc.timestamp_millis_opt(1_718_000_000_000 + id).unwrap(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Create(Value),
    Update(RowId, Value),
    Delete(RowId),
}

type FailureRule = Box<dyn Fn(&RemoteCall) -> Option<RemoteError> + Send + Sync>;

#[derive(Default)]
pub struct ScriptedRemote {
    calls: Mutex<Vec<RemoteCall>>,
    rules: Mutex<Vec<FailureRule>>,
    created_ids: Mutex<VecDeque<RowId>>,
}

impl ScriptedRemote {
    pub fn fail_when<F>(&self, rule: F)
    where
        F: Fn(&RemoteCall) -> Option<RemoteError> + Send + Sync + 'static,
    {
        self.rules.lock().unwrap().push(Box::new(rule));
    }

    pub fn assign_created_id(&self, id: RowId) {
        self.created_ids.lock().unwrap().push_back(id);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    fn handle(&self, call: RemoteCall) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call.clone());
        let rules = self.rules.lock().unwrap();
        match rules.iter().find_map(|rule| rule(&call)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for ScriptedRemote {
    async fn create(&self, fields: Map<String, Value>) -> Result<Option<RowId>, RemoteError> {
        self.handle(RemoteCall::Create(Value::Object(fields)))?;
        Ok(self.created_ids.lock().unwrap().pop_front())
    }

    async fn update(&self, id: &RowId, patch: Map<String, Value>) -> Result<(), RemoteError> {
        self.handle(RemoteCall::Update(id.clone(), Value::Object(patch)))
    }

    async fn delete(&self, id: &RowId) -> Result<(), RemoteError> {
        self.handle(RemoteCall::Delete(id.clone()))
    }
}
