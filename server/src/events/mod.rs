mod dispatcher;
pub use dispatcher::EventDispatcher;

mod event_loop;
pub use event_loop::{EventLoop, EventLoopHandle};

mod poll_config;
pub use poll_config::PollConfig;
