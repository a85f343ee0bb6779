mod handler;
mod model;

pub use handler::{logout, mock_login, refresh_token, status};
