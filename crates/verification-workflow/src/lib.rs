//! Chat <-> forum account verification.
//!
//! `verify <profile url>` hands the requester a one-time code and spawns a
//! session that polls the forum profile until the code appears, the
//! deadline passes, or something breaks. A match links both identities in
//! the user store and grants the verified role. Every session ends with
//! one [`SessionReport`].

mod code;
mod config;
mod error;
mod profile;
mod session;
mod workflow;

pub use code::{generate_code, CODE_BYTES};
pub use config::{describe_duration, VerificationConfig};
pub use error::{LinkError, LinkStep, VerifyError, VerifyResult};
pub use profile::parse_profile_url;
pub use session::{SessionOutcome, SessionReport, VerificationSession};
pub use workflow::{Collaborators, VerificationWorkflow, WorkflowContext};
