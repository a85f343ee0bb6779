// Cache key module
// Deterministic key builders and TTLs, one file per upstream

// Intranet cache keys
pub mod intranet_keys;

// LMS cache keys
pub mod lms_keys;

// Token cache keys
pub mod auth_keys;

// Campus events cache keys
pub mod event_keys;

pub use auth_keys::refresh_token_key;
