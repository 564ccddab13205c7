/// ホストアプリが把握しているネットワーク状態。
pub trait ConnectivityMonitor: Send + Sync {
    fn is_online(&self) -> bool;
}
