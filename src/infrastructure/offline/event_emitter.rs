use crate::application::ports::{ReplayEvent, ReplayEventEmitter};
use tokio::sync::broadcast;

/// UI 側（未同期バッジ等）へリプレイ結果を配信する。購読者がいなくてもエラーにしない。
pub struct BroadcastEventEmitter {
    sender: broadcast::Sender<ReplayEvent>,
}

impl BroadcastEventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReplayEvent> {
        self.sender.subscribe()
    }
}

impl ReplayEventEmitter for BroadcastEventEmitter {
    fn emit(&self, event: ReplayEvent) -> Result<(), String> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}
