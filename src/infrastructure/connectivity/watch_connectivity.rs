use crate::application::ports::ConnectivityMonitor;
use tokio::sync::watch;

/// ホストアプリのネットワークイベント（online/offline）を受け取り、購読者へ伝える。
pub struct WatchConnectivity {
    sender: watch::Sender<bool>,
}

impl WatchConnectivity {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self { sender }
    }

    /// Returns `true` when the state actually changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            tracing::info!(target: "offline::job", online, "connectivity changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl ConnectivityMonitor for WatchConnectivity {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }
}
