#![allow(dead_code)]

use async_trait::async_trait;
use hytani_sync::infrastructure::connectivity::WatchConnectivity;
use hytani_sync::infrastructure::offline::KeyValueQueueStore;
use hytani_sync::{
    KeyValueStore, MutationDispatcher, OfflineSyncService, QueueAccess, RemoteError, RemoteStore,
    RetryForever, RowId, TemporaryIdRule,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const QUEUE_KEY: &str = "hytani_offline_queue";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Value),
    Update(RowId, Value),
    Delete(RowId),
}

/// Records every call; creates whose `name` or deletes/updates whose id is listed fail with a
/// transient error.
#[derive(Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<Call>>,
    failing_names: Mutex<HashSet<String>>,
    failing_ids: Mutex<HashSet<String>>,
    next_created_id: Mutex<Option<i64>>,
}

impl RecordingRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_name(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_id(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn recover(&self) {
        self.failing_names.lock().unwrap().clear();
        self.failing_ids.lock().unwrap().clear();
    }

    pub fn assign_ids_from(&self, first: i64) {
        *self.next_created_id.lock().unwrap() = Some(first);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn outage() -> RemoteError {
        RemoteError::Unavailable { status: 503 }
    }
}

#[async_trait]
impl RemoteStore for RecordingRemote {
    async fn create(&self, fields: Map<String, Value>) -> Result<Option<RowId>, RemoteError> {
        let value = Value::Object(fields);
        self.calls.lock().unwrap().push(Call::Create(value.clone()));
        let name = value.get("name").and_then(Value::as_str).unwrap_or_default();
        if self.failing_names.lock().unwrap().contains(name) {
            return Err(Self::outage());
        }
        let mut next = self.next_created_id.lock().unwrap();
        Ok(next.as_mut().map(|id| {
            let assigned = *id;
            *id += 1;
            RowId::Number(assigned)
        }))
    }

    async fn update(&self, id: &RowId, patch: Map<String, Value>) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(id.clone(), Value::Object(patch)));
        if self.failing_ids.lock().unwrap().contains(&id.to_string()) {
            return Err(Self::outage());
        }
        Ok(())
    }

    async fn delete(&self, id: &RowId) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Delete(id.clone()));
        if self.failing_ids.lock().unwrap().contains(&id.to_string()) {
            return Err(Self::outage());
        }
        Ok(())
    }
}

pub fn queue_over(kv: Arc<dyn KeyValueStore>) -> Arc<QueueAccess> {
    Arc::new(QueueAccess::new(Arc::new(KeyValueQueueStore::new(
        kv, QUEUE_KEY,
    ))))
}

pub struct Harness {
    pub queue: Arc<QueueAccess>,
    pub service: Arc<OfflineSyncService>,
    pub connectivity: Arc<WatchConnectivity>,
}

pub fn harness(kv: Arc<dyn KeyValueStore>, remote: Arc<dyn RemoteStore>, online: bool) -> Harness {
    let queue = queue_over(kv);
    let connectivity = Arc::new(WatchConnectivity::new(online));
    let dispatcher = Arc::new(MutationDispatcher::new(remote, TemporaryIdRule::default()));
    let service = Arc::new(OfflineSyncService::new(
        queue.clone(),
        dispatcher,
        Arc::new(RetryForever),
        connectivity.clone(),
    ));
    Harness {
        queue,
        service,
        connectivity,
    }
}
