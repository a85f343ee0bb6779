mod handler;

pub use handler::{details, list_events, my_registrations, register};
