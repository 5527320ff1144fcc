//! StackIt domain layer.
//!
//! Pure types, constants and validation shared by the persistence,
//! notification and HTTP crates. Nothing in here performs I/O.

pub mod channels;
pub mod content;
pub mod error;
pub mod mentions;
pub mod notification;
pub mod types;
