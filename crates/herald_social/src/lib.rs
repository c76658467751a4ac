//! Social platform integrations for Herald.
//!
//! Publishers implement [`herald_interface::PublishBackend`]; the X reader implements
//! [`herald_interface::AccountReader`]. HTTP statuses are mapped onto
//! [`herald_error::SocialErrorKind`] in one place so retry decisions stay typed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod discord;
mod http;
mod dry_run;
mod retrying;
mod x;

pub use discord::{DISCORD_MAX_CONTENT, DiscordWebhookPublisher};
pub use dry_run::LogPublisher;
pub use retrying::{PublishRetryConfig, RetryingPublisher};
pub use x::{X_API_BASE, X_MAX_POST_LENGTH, XAccountReader, XPublisher};
