//! Entity definitions for persisted records

pub mod message;

pub use message::{Message, MessageRole};
