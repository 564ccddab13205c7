pub mod postgrest;

pub use postgrest::PostgrestRemoteStore;
