// Intranet adapter variants

mod cached;
mod mock;
mod real;

pub use cached::CachedIntranet;
pub use mock::MockIntranet;
pub use real::IntranetClient;
