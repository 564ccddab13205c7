use crate::domain::value_objects::SyncTrigger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub run_id: String,
    pub trigger: Option<SyncTrigger>,
    pub succeeded: u32,
    pub failed: u32,
    pub deferred: u32,
    pub discarded: u32,
    pub remaining: u32,
}

impl ReplayReport {
    pub fn empty(run_id: String) -> Self {
        Self {
            run_id,
            trigger: None,
            succeeded: 0,
            failed: 0,
            deferred: 0,
            discarded: 0,
            remaining: 0,
        }
    }

    pub fn with_trigger(mut self, trigger: SyncTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn attempted(&self) -> u32 {
        self.succeeded + self.failed + self.discarded
    }
}
