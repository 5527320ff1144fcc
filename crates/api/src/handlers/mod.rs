pub mod answer;
pub mod comment;
pub mod notification;
pub mod preference;
pub mod question;
pub mod vote;
