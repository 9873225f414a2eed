//! Forum account access.
//!
//! [`ForumClient`] is the seam the verification workflow reads profiles
//! through. [`InvisionClient`] talks to the Invision Community REST API;
//! `StaticForumClient` (behind the `testing` feature) replays scripted
//! members in tests.

mod client;
mod error;
mod invision;
mod models;
#[cfg(any(test, feature = "testing"))]
mod testing;

pub use client::ForumClient;
pub use error::{ForumError, ForumResult};
pub use invision::InvisionClient;
pub use models::{CustomField, FieldGroup, ForumMember};
#[cfg(any(test, feature = "testing"))]
pub use testing::StaticForumClient;
