pub mod connectivity;
pub mod offline;
pub mod remote;
pub mod storage;
