// LMS adapter variants

mod cached;
mod mock;
mod real;

pub use cached::CachedLms;
pub use mock::MockLms;
pub use real::LmsClient;
