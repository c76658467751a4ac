//! X (Twitter) API v2 integration.

mod publisher;
mod reader;
mod wire;

pub use publisher::XPublisher;
pub use reader::XAccountReader;

/// Default X API origin.
pub const X_API_BASE: &str = "https://api.x.com";

/// Post length limit on X for non-premium accounts.
pub const X_MAX_POST_LENGTH: usize = 280;
