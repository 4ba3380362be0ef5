//! Conversation session lifecycle for ImoScope
//!
//! A session is one continuous conversation anchored by a server-issued
//! identifier: an initial image analysis plus zero or more follow-ups. The
//! [`ConversationController`] is the only writer of session state; everything
//! else reads through [`Session`] getters.

pub mod controller;
pub mod session;

pub use controller::{ControllerState, ConversationController};
pub use session::Session;
