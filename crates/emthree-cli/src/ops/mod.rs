//! Command flows built on the engine.
//!
//! Each flow takes a [`Context`] so tests can point it at a mock registry and
//! a scripted decider.

pub mod add;
pub mod context;
pub mod init;

pub use context::Context;
