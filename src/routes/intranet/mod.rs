mod handler;

pub use handler::{
    announcements, attendance, profile, refresh, schedule, today_schedule, weekly_schedule,
};
