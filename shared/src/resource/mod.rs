pub mod error;
pub mod resource;
pub mod resource_id;
pub mod resource_pool;
pub mod resource_set;
