//! Chat platform access for the bot.
//!
//! [`ChatClient`] and [`ErrorReporter`] are the seams the command and
//! verification layers depend on. [`DiscordRestClient`] is the production
//! implementation; the recording fakes behind the `testing` feature back
//! the tests.

mod client;
mod discord;
mod error;
mod models;
mod reporter;
#[cfg(any(test, feature = "testing"))]
mod testing;

pub use client::ChatClient;
pub use discord::{DiscordRestClient, DISCORD_API_BASE};
pub use error::{ChatError, ChatResult};
pub use models::{ChannelKind, IncomingMessage, Role};
pub use reporter::{ChannelErrorReporter, ErrorReporter};
#[cfg(any(test, feature = "testing"))]
pub use testing::{RecordingChatClient, RecordingErrorReporter};
