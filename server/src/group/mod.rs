mod group_registry;
pub use group_registry::GroupRegistry;

mod worker_group;
pub use worker_group::WorkerGroup;
