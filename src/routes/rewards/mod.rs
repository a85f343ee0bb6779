mod handler;

pub use handler::{activities, list_rewards, points, redeem, redemptions, register_activity};
