pub mod offline;

pub use offline::{MutationRecord, ReplayReport};
