pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent for dataset downloads.
pub const USER_AGENT: &str = concat!("craft-price-index/", env!("CARGO_PKG_VERSION"));
