pub mod offline;

pub use offline::{OfflineSyncService, OfflineSyncServiceTrait, WriteOutcome};
