pub mod script;

pub use script::{parse_chat_script, ChatScript};
