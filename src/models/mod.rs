//! Data models for Close API responses and sync state

pub mod common;
pub mod custom_field;
pub mod state;
pub mod stream;

pub use common::*;
pub use custom_field::*;
pub use state::*;
pub use stream::*;
