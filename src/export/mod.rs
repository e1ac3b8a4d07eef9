//! Output: message stream and state persistence

pub mod singer;
pub mod state_file;

pub use self::singer::{Message, MessageWriter};
pub use self::state_file::persist_state;
