//! Row models and DTOs, one module per table group.

pub mod answer;
pub mod comment;
pub mod notification;
pub mod question;
pub mod user;
