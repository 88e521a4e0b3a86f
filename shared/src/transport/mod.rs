pub mod error;
pub mod worker_client;
