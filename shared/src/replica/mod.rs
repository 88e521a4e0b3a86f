pub mod error;
pub mod registry;
pub mod replicated_object;
