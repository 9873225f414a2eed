//! Application wiring and the event loop.

mod events;
mod init;
mod verification;

pub use events::EventHandler;
pub use init::run_bot;
pub use verification::StoreVerificationCheck;
