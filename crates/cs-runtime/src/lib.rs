pub mod engine;
pub mod listener;

pub use engine::{ChatEngine, ChatEngineOptions, DEFAULT_SETTLE_DELAY};
pub use listener::ChatEventListener;
