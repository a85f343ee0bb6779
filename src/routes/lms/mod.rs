mod handler;

pub use handler::{announcements, assignments, content, courses, grades, refresh_course};
