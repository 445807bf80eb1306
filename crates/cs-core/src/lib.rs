pub mod command;
pub mod error;

pub use command::*;
pub use error::ChatScriptError;
