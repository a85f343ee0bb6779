pub mod auth;
pub mod chat;
pub mod events;
pub mod intranet;
pub mod lms;
pub mod rewards;
pub mod tools;
