use std::time::Duration;

/// Upcoming campus events, shared by every user
pub const UPCOMING_EVENTS_KEY: &str = "events:all";

pub const UPCOMING_EVENTS_TTL: Duration = Duration::from_secs(900);
