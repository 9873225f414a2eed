//! Commands owned by the binary.

mod whois;

pub use whois::{parse_user_reference, WhoisCommand};
