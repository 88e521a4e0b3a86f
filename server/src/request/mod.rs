mod error;
pub use error::CallbackError;

mod pending_requests;
pub use pending_requests::PendingRequests;

mod runners_callback;
pub use runners_callback::RunnersCallback;
