//! Cross-thread task queue.
//!
//! HTTP worker threads hand work back to the game thread through here
//! instead of touching shared game state from off the game thread.

pub mod queue;

pub use queue::*;
