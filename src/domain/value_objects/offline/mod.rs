pub mod mutation_action;
pub mod mutation_id;
pub mod mutation_payload;
pub mod row_id;
pub mod sync_trigger;

pub use mutation_action::MutationAction;
pub use mutation_id::MutationId;
pub use mutation_payload::{MutationPayload, ROW_ID_FIELD};
pub use row_id::{RowId, TemporaryIdRule};
pub use sync_trigger::SyncTrigger;
