mod append_batcher;
pub use append_batcher::{AppendBatcher, AppendKey};

mod append_config;
pub use append_config::AppendConfig;
