mod handler;
mod model;

pub use handler::{create_session, history, list_sessions, send_message};
