mod handler;

pub use handler::{book_room, my_bookings, my_print_jobs, submit_print_job};
