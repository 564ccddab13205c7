pub mod offline;

pub use offline::{
    MutationAction, MutationId, MutationPayload, RowId, SyncTrigger, TemporaryIdRule, ROW_ID_FIELD,
};
