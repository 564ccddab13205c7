pub mod mutation_record;
pub mod replay_report;

pub use mutation_record::MutationRecord;
pub use replay_report::ReplayReport;
