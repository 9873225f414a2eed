//! Durable links between chat accounts and forum accounts.
//!
//! Each record pairs one chat identity with one forum identity; both are
//! unique across the store. [`UserStore`] is the seam the rest of the bot
//! depends on, with a SQLite implementation for production and an
//! in-memory one for tests.

mod error;
mod executor;
mod memory;
mod migrations;
mod models;
pub mod queries;
mod store;

pub use error::{DuplicateKey, UserStoreError, UserStoreResult};
pub use executor::AsyncDatabase;
pub use memory::InMemoryUserStore;
pub use migrations::{run_migrations, CURRENT_VERSION};
pub use models::{LinkedUser, NewLinkedUser};
pub use store::{SqliteUserStore, UserStore};
