//! Command registry and dispatch.
//!
//! A [`Router`] classifies where a message came from, resolves its first
//! word against an immutable [`CommandRegistry`], checks the command's
//! context and argument constraints, and runs its [`CommandHandler`].
//! Unknown or out-of-context commands are ignored without side effects.

mod command;
mod error;
mod router;

pub use command::{Command, CommandHandler, CommandRegistry, CommandSource, ParameterRange};
pub use error::{HandlerError, RouterError, RouterResult};
pub use router::{
    parameter_count, split_trigger, ChannelConfig, ProcessOutcome, Router, VerificationCheck,
};
